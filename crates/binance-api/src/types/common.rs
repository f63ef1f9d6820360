//! Common types used across the API.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Empty response (e.g., from ping).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Empty {}

/// Kline/candlestick interval, using Binance interval labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum KlineInterval {
    /// 1 minute
    #[serde(rename = "1m")]
    OneMinute,
    /// 5 minutes
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minutes
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minutes
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// 1 hour
    #[serde(rename = "1h")]
    OneHour,
    /// 4 hours
    #[serde(rename = "4h")]
    FourHours,
    /// 1 day
    #[serde(rename = "1d")]
    OneDay,
    /// 1 week
    #[serde(rename = "1w")]
    OneWeek,
    /// 1 month
    #[serde(rename = "1M")]
    OneMonth,
}

impl KlineInterval {
    /// Wire label (e.g. "1h").
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::FourHours => "4h",
            KlineInterval::OneDay => "1d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }

    /// Parse a wire label. Labels are case-sensitive ("1m" is not "1M").
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "1m" => KlineInterval::OneMinute,
            "5m" => KlineInterval::FiveMinutes,
            "15m" => KlineInterval::FifteenMinutes,
            "30m" => KlineInterval::ThirtyMinutes,
            "1h" => KlineInterval::OneHour,
            "4h" => KlineInterval::FourHours,
            "1d" => KlineInterval::OneDay,
            "1w" => KlineInterval::OneWeek,
            "1M" => KlineInterval::OneMonth,
            _ => return None,
        })
    }
}

impl std::fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decimal wrapper that deserializes from a string or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StringDecimal(pub Decimal);

impl StringDecimal {
    /// Create a new StringDecimal.
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the inner Decimal value.
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Lossy conversion for chart math. Returns NaN when out of range.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl From<Decimal> for StringDecimal {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<StringDecimal> for Decimal {
    fn from(value: StringDecimal) -> Self {
        value.0
    }
}

impl std::ops::Deref for StringDecimal {
    type Target = Decimal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StringDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(f64),
        }

        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s
                .parse::<Decimal>()
                .map(StringDecimal)
                .map_err(|e| D::Error::custom(format!("invalid decimal: {e}"))),
            StringOrNumber::Number(n) => Decimal::try_from(n)
                .map(StringDecimal)
                .map_err(|e| D::Error::custom(format!("invalid decimal: {e}"))),
        }
    }
}

impl Serialize for StringDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl std::fmt::Display for StringDecimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_labels() {
        assert_eq!(KlineInterval::OneHour.to_string(), "1h");
        assert_eq!(KlineInterval::from_label("1M"), Some(KlineInterval::OneMonth));
        assert_eq!(KlineInterval::from_label("1m"), Some(KlineInterval::OneMinute));
        assert_eq!(KlineInterval::from_label("60m"), None);
    }

    #[test]
    fn test_string_decimal_from_string_and_number() {
        let a: StringDecimal = serde_json::from_str("\"42.50\"").unwrap();
        let b: StringDecimal = serde_json::from_str("42.5").unwrap();
        assert_eq!(a.to_f64(), 42.5);
        assert_eq!(b.to_f64(), 42.5);
    }
}
