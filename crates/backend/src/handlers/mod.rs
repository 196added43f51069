pub mod a025_device;
pub mod a026_stock_box;
pub mod a028_inbound_import;
pub mod u508_inbound_import;
