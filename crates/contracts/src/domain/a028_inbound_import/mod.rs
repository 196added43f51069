pub mod aggregate;

pub use aggregate::{InboundImportId, InboundImportRecord};
