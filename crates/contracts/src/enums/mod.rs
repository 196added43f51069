pub mod stock_location;

pub use stock_location::StockLocation;
