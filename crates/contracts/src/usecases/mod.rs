pub mod common;
pub mod u508_inbound_import;
