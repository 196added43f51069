pub mod a025_device;
pub mod a026_stock_box;
pub mod a027_stock_item;
pub mod a028_inbound_import;
