//! Request and result payloads.

use alertchart_config::AnalysisMode;
use alertchart_core::{Candle, DrawingPoint, TrendlineDrawing};
use alertchart_trigger::ArmRequest;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder the service uses for a level it could not produce.
pub const NOT_AVAILABLE: &str = "N/A";

/// One candle as sent in `chartData`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Candle> for ChartPoint {
    fn from(c: &Candle) -> Self {
        Self {
            time: c.time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }
}

/// What to analyze.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub mode: AnalysisMode,
    pub candles: Vec<Candle>,
}

impl AnalysisRequest {
    pub fn new(symbol: impl Into<String>, mode: AnalysisMode, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            mode,
            candles,
        }
    }

    /// JSON body posted to the analysis function.
    pub fn body(&self) -> serde_json::Value {
        let chart_data: Vec<ChartPoint> = self.candles.iter().map(ChartPoint::from).collect();
        serde_json::json!({
            "symbol": self.symbol,
            "chartData": chart_data,
        })
    }

    pub fn last_time(&self) -> Option<i64> {
        self.candles.last().map(|c| c.time)
    }
}

/// A trade signal. Normal results carry the description and the three
/// levels; ultra results fill in the rest.
///
/// Levels stay strings (`"$1,234.50"`, `"N/A"`); they are parsed when the
/// signal is armed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub entry_price: String,
    #[serde(deserialize_with = "lenient_string")]
    pub take_profit: String,
    #[serde(deserialize_with = "lenient_string")]
    pub stop_loss: String,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub volatility: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub risk_reward_ratio: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub trade_management: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub alternative_scenario: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drawings: Vec<DrawingSpec>,
}

impl AnalysisResult {
    /// Result with every level set to `N/A`.
    pub fn unavailable(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            entry_price: NOT_AVAILABLE.to_string(),
            take_profit: NOT_AVAILABLE.to_string(),
            stop_loss: NOT_AVAILABLE.to_string(),
            ..Self::default()
        }
    }

    /// Valid drawings converted to core types. Drawings without a usable
    /// point are dropped.
    pub fn trendlines(&self) -> Vec<TrendlineDrawing> {
        self.drawings
            .iter()
            .filter_map(DrawingSpec::to_trendline)
            .collect()
    }

    /// Raw fields needed to arm the alert engine.
    pub fn arm_request(&self, symbol: &str, anchor_time: i64) -> ArmRequest {
        ArmRequest {
            symbol: symbol.to_string(),
            entry_price: self.entry_price.clone(),
            take_profit: self.take_profit.clone(),
            stop_loss: self.stop_loss.clone(),
            sentiment: self.sentiment.clone(),
            drawings: self.trendlines(),
            anchor_time,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A drawing as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub points: Vec<PointSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DrawingSpec {
    fn to_trendline(&self) -> Option<TrendlineDrawing> {
        let points: Vec<DrawingPoint> = self
            .points
            .iter()
            .filter_map(|p| match (p.time, p.price) {
                (Some(time), Some(price)) if time.is_finite() && price.is_finite() => {
                    Some(DrawingPoint {
                        time: time as i64,
                        price,
                    })
                }
                _ => None,
            })
            .collect();
        if points.is_empty() {
            return None;
        }
        Some(TrendlineDrawing {
            kind: self.kind.clone(),
            label: self.label.clone(),
            points,
        })
    }
}

/// A drawing point; either coordinate may be missing or quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointSpec {
    #[serde(deserialize_with = "lenient_f64")]
    pub time: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_else(|| NOT_AVAILABLE.to_string()))
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => alertchart_core::parse_price(&s),
        _ => None,
    })
}
