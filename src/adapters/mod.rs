// Adapters layer: concrete transports for reaching external storage.

pub mod http;

pub use http::{HttpConnection, HttpTransport};
