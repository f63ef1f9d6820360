//! Symbol and price-string helpers.

/// Normalise user input into an exchange symbol: uppercase ASCII
/// alphanumerics only ("btc-usdt " becomes "BTCUSDT").
pub fn sanitize_symbol(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Human-readable pair name ("BTCUSDT" becomes "BTC/USDT").
pub fn display_pair(symbol: &str) -> String {
    match symbol.strip_suffix("USDT") {
        Some(base) if !base.is_empty() => format!("{base}/USDT"),
        _ => symbol.to_string(),
    }
}

/// Parse a price level as produced by the analysis service, e.g. `"$1,234.50"`.
///
/// Returns `None` for placeholders such as `"N/A"`, empty strings and
/// non-finite values.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Format a price the way levels are quoted in analysis results (`$X.XX`).
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_symbol() {
        assert_eq!(sanitize_symbol(" btc-usdt "), "BTCUSDT");
        assert_eq!(sanitize_symbol("eth/usdt"), "ETHUSDT");
        assert_eq!(sanitize_symbol("$$$"), "");
    }

    #[test]
    fn test_display_pair() {
        assert_eq!(display_pair("BTCUSDT"), "BTC/USDT");
        assert_eq!(display_pair("ETHBTC"), "ETHBTC");
        assert_eq!(display_pair("USDT"), "USDT");
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price("$1,234.50"), Some(1234.5));
        assert_eq!(parse_price("  100 "), Some(100.0));
        assert_eq!(parse_price("0.00042"), Some(0.00042));
    }

    #[test]
    fn test_parse_price_rejects_placeholders() {
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price("NaN"), None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(100.1), "$100.10");
        assert_eq!(format_price(99.999), "$100.00");
    }
}
