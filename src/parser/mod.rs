pub mod binance_parser;

pub use binance_parser::BinanceParser;
