pub mod box_code;
pub mod column_inference;
pub mod commit_executor;
pub mod device_resolver;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod label_emitter;
pub mod layout_detector;
pub mod parser;
pub mod reconciliation;
pub mod tabular_reader;

pub use error::ImportError;
pub use executor::InboundImportExecutor;
