pub mod env;
pub mod http;
pub mod import;
pub mod log;
pub mod marketplace;
pub mod notion;
mod performance;
pub mod sale_time;
pub mod units;

pub use import::import_sales;
pub use import::run;
pub use import::ImportSettings;
