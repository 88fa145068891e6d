pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::{HttpConnection, HttpTransport};
pub use config::{LogFormat, LoggingConfig, TransferConfig, TransportConfig};
pub use core::transfer::PayloadStorage;
pub use domain::model::{ExternalStorageLocation, Operation, PayloadStream, PayloadType, Request};
pub use domain::ports::{Connection, ExternalPayloadStorage, Transport};
pub use utils::error::{LocationError, PayloadStorageError, Result};
