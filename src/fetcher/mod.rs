pub mod binance;
pub mod traits;

pub use binance::BinanceFetcher;
pub use traits::MarketFetcher;
