//! Parsing of free-form model replies into [`AnalysisFields`].

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::types::{AnalysisFields, DefaultReason};

/// The text between the first `{` and the last `}`, inclusive.
#[must_use]
pub fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses a model reply.
///
/// Every field must be present and coercible; otherwise the whole reply is
/// rejected with the reason it failed.
///
/// # Errors
///
/// - [`DefaultReason::NoJsonSpan`]: no `{ ... }` in the reply.
/// - [`DefaultReason::InvalidJson`]: the span does not parse as JSON.
/// - [`DefaultReason::SchemaMismatch`]: not an object, or a field is missing
///   or has an unusable value.
pub fn parse_analysis(reply: &str) -> Result<AnalysisFields, DefaultReason> {
    let span = json_span(reply).ok_or(DefaultReason::NoJsonSpan)?;
    let value: Value = serde_json::from_str(span).map_err(|_| DefaultReason::InvalidJson)?;
    let obj = value.as_object().ok_or(DefaultReason::SchemaMismatch)?;
    fields_from_object(obj).ok_or(DefaultReason::SchemaMismatch)
}

fn fields_from_object(obj: &Map<String, Value>) -> Option<AnalysisFields> {
    Some(AnalysisFields {
        investment_thesis_tag: string_field(obj, "investment_thesis_tag")?,
        technology_readiness_level: int_field(obj, "technology_readiness_level")?,
        regulated_asset_potential: bool_field(obj, "regulated_asset_potential")?,
        ny_service_territory_relevance: bool_field(obj, "ny_service_territory_relevance")?,
        grid_impact_score: int_field(obj, "grid_impact_score")?,
        clcpa_compliance_value: string_field(obj, "clcpa_compliance_value")?,
        capital_investment_required: label_field(obj, "capital_investment_required")?,
        implementation_timeline: label_field(obj, "implementation_timeline")?,
        risk_assessment: label_field(obj, "risk_assessment")?,
        strategic_priority: label_field(obj, "strategic_priority")?,
    })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)?.as_str().map(|s| s.trim().to_owned())
}

/// Integers from JSON numbers with no fractional part, or numeric strings.
fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| whole_number(n.as_f64()?)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn label_field<T: FromStr>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    obj.get(key)?.as_str()?.parse().ok()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
