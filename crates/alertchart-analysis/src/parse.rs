//! Lenient decoding of analysis bodies.

use crate::error::AnalysisError;
use crate::types::AnalysisResult;

/// Remove markdown code fences a model may wrap its JSON in.
pub fn strip_code_fences(body: &str) -> &str {
    let trimmed = body.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

/// Decode an analysis body.
///
/// An `{"error": ...}` object becomes [`AnalysisError::Service`]; anything
/// that is not a JSON object becomes [`AnalysisError::Parse`].
pub fn parse_result(body: &str) -> Result<AnalysisResult, AnalysisError> {
    let json = strip_code_fences(body);
    let value: serde_json::Value = serde_json::from_str(json)?;

    let Some(object) = value.as_object() else {
        return Err(AnalysisError::Parse(format!("expected an object, got {value}")));
    };
    if let Some(error) = object.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AnalysisError::Service(message));
    }

    Ok(serde_json::from_value(value)?)
}
