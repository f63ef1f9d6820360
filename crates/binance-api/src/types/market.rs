//! Market data types.

use super::common::StringDecimal;
use serde::{Deserialize, Serialize};

/// Kline/candlestick data.
///
/// Binance sends klines as positional arrays; only the first six fields
/// (open time plus OHLCV) are required, the rest default when missing.
#[derive(Debug, Clone, Serialize)]
pub struct Kline {
    /// Open time in milliseconds.
    pub open_time: i64,
    /// Open price.
    pub open: StringDecimal,
    /// High price.
    pub high: StringDecimal,
    /// Low price.
    pub low: StringDecimal,
    /// Close price.
    pub close: StringDecimal,
    /// Volume.
    pub volume: StringDecimal,
    /// Close time in milliseconds.
    pub close_time: Option<i64>,
    /// Number of trades.
    pub trades: Option<i64>,
}

impl<'de> Deserialize<'de> for Kline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let arr: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;

        if arr.len() < 6 {
            return Err(D::Error::custom("kline array too short"));
        }

        let parse_decimal = |v: &serde_json::Value| -> Result<StringDecimal, D::Error> {
            StringDecimal::deserialize(v).map_err(|e| D::Error::custom(e.to_string()))
        };

        let parse_i64 = |v: &serde_json::Value| -> Result<i64, D::Error> {
            v.as_i64()
                .ok_or_else(|| D::Error::custom("expected integer"))
        };

        Ok(Kline {
            open_time: parse_i64(&arr[0])?,
            open: parse_decimal(&arr[1])?,
            high: parse_decimal(&arr[2])?,
            low: parse_decimal(&arr[3])?,
            close: parse_decimal(&arr[4])?,
            volume: parse_decimal(&arr[5])?,
            close_time: arr.get(6).and_then(|v| v.as_i64()),
            trades: arr.get(8).and_then(|v| v.as_i64()),
        })
    }
}

/// Price ticker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceTicker {
    /// Symbol.
    pub symbol: String,
    /// Price.
    pub price: StringDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_binance_kline() {
        let json = r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]"#;
        let kline: Kline = serde_json::from_str(json).unwrap();
        assert_eq!(kline.open_time, 1499040000000);
        assert_eq!(kline.close.to_f64(), 0.015771);
        assert_eq!(kline.close_time, Some(1499644799999));
        assert_eq!(kline.trades, Some(308));
    }

    #[test]
    fn test_short_kline() {
        let kline: Kline = serde_json::from_str(r#"[1, "1", "2", "0.5", "1.5", "10"]"#).unwrap();
        assert_eq!(kline.high.to_f64(), 2.0);
        assert!(kline.close_time.is_none());

        assert!(serde_json::from_str::<Kline>(r#"[1, "1", "2"]"#).is_err());
    }
}
