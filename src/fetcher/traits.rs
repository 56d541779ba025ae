use crate::model::{FetchError, KlineRequest};

/// Source of raw market data bodies. Parsing happens separately.
#[async_trait::async_trait]
pub trait MarketFetcher: Send + Sync {
    async fn fetch_klines(&self, req: &KlineRequest) -> Result<String, FetchError>;
    async fn fetch_ticker(&self, symbol: &str) -> Result<String, FetchError>;
}
