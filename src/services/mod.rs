pub mod scan_source;
pub mod transport;
pub mod validation_client;

pub use scan_source::{ActiveScan, DecodeHandler, Html5QrcodeSource, ScanSource};
pub use transport::{FetchTransport, Transport, TransportError, TransportResponse};
pub use validation_client::{ValidationClient, classify_response};
