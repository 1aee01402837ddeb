pub mod executor;
pub mod fallback;
pub mod transports;

pub use executor::TransportResolver;
pub use transports::{CsvExportTransport, RowTransport, ScriptTransport, TransportError};
