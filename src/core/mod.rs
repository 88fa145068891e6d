pub mod transfer;

pub use crate::domain::model::{
    ExternalStorageLocation, Operation, PayloadStream, PayloadType, Request,
};
pub use crate::domain::ports::{Connection, ExternalPayloadStorage, Transport};
pub use crate::utils::error::Result;
