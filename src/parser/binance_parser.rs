// Binance REST JSON parsing
use crate::model::{Candle, ParserError, TickerSnapshot};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

pub struct BinanceParser;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicker {
    last_price: Option<Value>,
    price_change_percent: Option<Value>,
    volume: Option<Value>,
}

impl BinanceParser {
    /// Parses the array-of-arrays kline body into candles sorted by open time.
    pub fn parse_klines(body: &str) -> Result<Vec<Candle>, ParserError> {
        let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
        let mut candles = rows
            .iter()
            .map(|row| parse_kline_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        candles.sort_by_key(|c| c.open_time);
        Ok(candles)
    }

    pub fn parse_ticker(body: &str) -> Result<TickerSnapshot, ParserError> {
        let raw: RawTicker = serde_json::from_str(body)?;
        Ok(TickerSnapshot {
            last_price: required_number("lastPrice", raw.last_price.as_ref())?,
            price_change_percent: required_number("priceChangePercent", raw.price_change_percent.as_ref())?,
            volume: required_number("volume", raw.volume.as_ref())?,
        })
    }
}

fn parse_kline_row(row: &[Value]) -> Result<Candle, ParserError> {
    let millis = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| ParserError::MissingField("open_time".into()))?;
    let open_time = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| ParserError::InvalidNumber {
        field: "open_time".into(),
        value: millis.to_string(),
    })?;

    let column = |index: usize, field: &str| required_number(field, row.get(index));
    Ok(Candle {
        open_time,
        open: column(1, "open")?,
        high: column(2, "high")?,
        low: column(3, "low")?,
        close: column(4, "close")?,
        volume: column(5, "volume")?,
    })
}

/// Binance sends decimals as strings; plain JSON numbers are accepted too.
fn required_number(field: &str, value: Option<&Value>) -> Result<f64, ParserError> {
    let invalid = |value: String| ParserError::InvalidNumber {
        field: field.to_string(),
        value,
    };
    match value {
        None | Some(Value::Null) => Err(ParserError::MissingField(field.to_string())),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid(s.clone())),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(n.to_string())),
        Some(other) => Err(invalid(other.to_string())),
    }
}
