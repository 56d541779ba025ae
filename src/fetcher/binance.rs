use super::traits::MarketFetcher;
use crate::model::{FetchError, KlineRequest};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Binance public REST market data (`/klines`, `/ticker/24hr`).
#[derive(Clone)]
pub struct BinanceFetcher {
    client: Client,
    base_url: String,
}

impl BinanceFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("KlineSniperBot/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn klines_url(&self, req: &KlineRequest) -> String {
        format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            self.base_url, req.symbol, req.interval, req.limit
        )
    }

    fn ticker_url(&self, symbol: &str) -> String {
        format!("{}/ticker/24hr?symbol={}", self.base_url, symbol)
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::InvalidResponse(status.as_u16()));
        }

        response.text().await.map_err(map_reqwest)
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e.to_string())
    }
}

#[async_trait::async_trait]
impl MarketFetcher for BinanceFetcher {
    async fn fetch_klines(&self, req: &KlineRequest) -> Result<String, FetchError> {
        self.get(&self.klines_url(req)).await
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<String, FetchError> {
        self.get(&self.ticker_url(symbol)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls() {
        let fetcher = BinanceFetcher::new("https://data-api.binance.vision/api/v3/").unwrap();
        let req = KlineRequest {
            symbol: "BTCUSDT".into(),
            interval: "15m".into(),
            limit: 500,
        };
        assert_eq!(
            fetcher.klines_url(&req),
            "https://data-api.binance.vision/api/v3/klines?symbol=BTCUSDT&interval=15m&limit=500"
        );
        assert_eq!(
            fetcher.ticker_url("ETHUSDT"),
            "https://data-api.binance.vision/api/v3/ticker/24hr?symbol=ETHUSDT"
        );
    }
}
