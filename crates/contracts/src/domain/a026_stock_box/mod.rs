pub mod aggregate;

pub use aggregate::{BoxKey, StockBox, StockBoxId};
