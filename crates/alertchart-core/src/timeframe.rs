//! Kline interval types.

use std::fmt;
use std::str::FromStr;

/// Kline interval for chart sessions and live subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Min1,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour4,
    Day1,
    Week1,
    Month1, // 30 day approximation
}

impl Timeframe {
    /// Returns the duration of this timeframe in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::Min1 => 60,
            Timeframe::Min5 => 5 * 60,
            Timeframe::Min15 => 15 * 60,
            Timeframe::Min30 => 30 * 60,
            Timeframe::Hour1 => 60 * 60,
            Timeframe::Hour4 => 4 * 60 * 60,
            Timeframe::Day1 => 24 * 60 * 60,
            Timeframe::Week1 => 7 * 24 * 60 * 60,
            Timeframe::Month1 => 30 * 24 * 60 * 60,
        }
    }

    /// Returns the exchange interval label for this timeframe.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Min1 => "1m",
            Timeframe::Min5 => "5m",
            Timeframe::Min15 => "15m",
            Timeframe::Min30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1d",
            Timeframe::Week1 => "1w",
            Timeframe::Month1 => "1M",
        }
    }

    /// Returns all available timeframes in order.
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Min1,
            Timeframe::Min5,
            Timeframe::Min15,
            Timeframe::Min30,
            Timeframe::Hour1,
            Timeframe::Hour4,
            Timeframe::Day1,
            Timeframe::Week1,
            Timeframe::Month1,
        ]
    }

    /// Look up a timeframe by its label. Labels are case-sensitive because
    /// `1m` (minute) and `1M` (month) differ only by case.
    pub fn from_label(label: &str) -> Option<Timeframe> {
        Timeframe::all().iter().copied().find(|tf| tf.label() == label)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::from_label(s.trim()).ok_or_else(|| format!("unknown interval: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for tf in Timeframe::all() {
            assert_eq!(Timeframe::from_label(tf.label()), Some(*tf));
        }
    }

    #[test]
    fn test_minute_and_month_are_distinct() {
        assert_eq!("1m".parse::<Timeframe>().unwrap(), Timeframe::Min1);
        assert_eq!("1M".parse::<Timeframe>().unwrap(), Timeframe::Month1);
        assert!("2d".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_seconds() {
        assert_eq!(Timeframe::Min15.seconds(), 900);
        assert_eq!(Timeframe::Day1.seconds(), 86_400);
    }
}
