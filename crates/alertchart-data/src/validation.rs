//! Validation utilities for market data.

use alertchart_core::Candle;

/// Validate a candle has reasonable values.
pub fn validate_candle(candle: &Candle) -> bool {
    candle.open.is_finite()
        && candle.high.is_finite()
        && candle.low.is_finite()
        && candle.close.is_finite()
        && candle.volume.is_finite()
        && candle.high >= candle.low
        && candle.open > 0.0
        && candle.close > 0.0
        && candle.low > 0.0
        && candle.volume >= 0.0
}

/// Validate a standalone price quote.
pub fn validate_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_candle_valid() {
        let candle = Candle::new(1000, 100.0, 105.0, 95.0, 102.0, 1000.0);
        assert!(validate_candle(&candle));
    }

    #[test]
    fn test_validate_candle_high_below_low() {
        let candle = Candle::new(1000, 100.0, 90.0, 95.0, 102.0, 1000.0);
        assert!(!validate_candle(&candle));
    }

    #[test]
    fn test_validate_candle_nan_close() {
        let candle = Candle::new(1000, 100.0, 105.0, 95.0, f64::NAN, 0.0);
        assert!(!validate_candle(&candle));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.5));
        assert!(!validate_price(0.0));
        assert!(!validate_price(f64::INFINITY));
    }
}
