pub mod aggregate;

pub use aggregate::{DeviceCatalogEntry, DeviceId};
