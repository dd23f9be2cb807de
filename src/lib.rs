// Expose the modules
pub mod api;
pub mod book;
pub mod config;
pub mod orderbook;
pub mod trade;
pub mod types;

// Re-export key types for easier usage
pub use api::Api;
pub use book::{BookError, BookResult, OrderBook, SubmitResult, Summary};
pub use config::Config;
pub use orderbook::{OrderList, OrderTree};
pub use trade::{TradeLog, TradeParty, TradeRecord, TradeSink};
pub use types::{NewOrder, Order, OrderType, OrderView, Side};
