//! Analysis schema returned by the remote model, and the records built from it.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use gridintel_core::RawRecord;
use serde::{Deserialize, Serialize};

/// Error returned when a label does not name any variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

/// Lowercased first word of `s`, so `"Long term"` and `"LONG-term"` both
/// become `"long"`.
fn first_word(s: &str) -> String {
    s.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == ',')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Declares a three-level label enum that serializes as its variant name and
/// parses case-insensitively from the first word of a label.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $word:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match first_word(s).as_str() {
                    $($word => Ok($name::$variant),)+
                    _ => Err(UnknownLabel(s.to_owned())),
                }
            }
        }
    };
}

label_enum!(
    /// Capital outlay an opportunity would require.
    CapitalInvestment { Low => "low", Medium => "medium", High => "high" }
);

label_enum!(
    /// Time to deployment.
    Timeline { Short => "short", Medium => "medium", Long => "long" }
);

label_enum!(RiskLevel { Low => "low", Medium => "medium", High => "high" });

label_enum!(
    /// Strategic priority for the utility. Orders `High` first.
    StrategicPriority { High => "high", Medium => "medium", Low => "low" }
);

/// The ten-field analysis schema.
///
/// Scores are stored as returned. `technology_readiness_level` is intended
/// to be 1-9 and `grid_impact_score` 1-10, but neither is clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFields {
    pub investment_thesis_tag: String,
    pub technology_readiness_level: i64,
    pub regulated_asset_potential: bool,
    pub ny_service_territory_relevance: bool,
    pub grid_impact_score: i64,
    pub clcpa_compliance_value: String,
    pub capital_investment_required: CapitalInvestment,
    pub implementation_timeline: Timeline,
    pub risk_assessment: RiskLevel,
    pub strategic_priority: StrategicPriority,
}

/// Thesis tag used by [`default_analysis`].
pub const DEFAULT_THESIS_TAG: &str = "Uncategorized";

/// Placeholder analysis substituted whenever enrichment fails.
///
/// Mid-range scores, `Medium` levels, and `false` for both indicators, so a
/// defaulted record never looks like a strong opportunity.
#[must_use]
pub fn default_analysis() -> AnalysisFields {
    AnalysisFields {
        investment_thesis_tag: DEFAULT_THESIS_TAG.to_owned(),
        technology_readiness_level: 5,
        regulated_asset_potential: false,
        ny_service_territory_relevance: false,
        grid_impact_score: 5,
        clcpa_compliance_value: "Requires further analysis".to_owned(),
        capital_investment_required: CapitalInvestment::Medium,
        implementation_timeline: Timeline::Medium,
        risk_assessment: RiskLevel::Medium,
        strategic_priority: StrategicPriority::Medium,
    }
}

/// Why an enrichment fell back to [`default_analysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// The reply contained no `{ ... }` span.
    NoJsonSpan,
    /// The span was not valid JSON.
    InvalidJson,
    /// Valid JSON, but a field was missing or had an unusable value.
    SchemaMismatch,
    /// The model call itself failed.
    CallFailed,
    /// No model is configured.
    Disabled,
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DefaultReason::NoJsonSpan => "no_json_span",
            DefaultReason::InvalidJson => "invalid_json",
            DefaultReason::SchemaMismatch => "schema_mismatch",
            DefaultReason::CallFailed => "call_failed",
            DefaultReason::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Parsed,
    Defaulted,
}

/// Result of one enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Parsed(AnalysisFields),
    Defaulted { reason: DefaultReason },
}

impl AnalysisOutcome {
    /// The analysis to report: parsed fields, or [`default_analysis`].
    #[must_use]
    pub fn fields(&self) -> Cow<'_, AnalysisFields> {
        match self {
            AnalysisOutcome::Parsed(fields) => Cow::Borrowed(fields),
            AnalysisOutcome::Defaulted { .. } => Cow::Owned(default_analysis()),
        }
    }

    #[must_use]
    pub fn into_fields(self) -> AnalysisFields {
        match self {
            AnalysisOutcome::Parsed(fields) => fields,
            AnalysisOutcome::Defaulted { .. } => default_analysis(),
        }
    }

    #[must_use]
    pub fn status(&self) -> AnalysisStatus {
        match self {
            AnalysisOutcome::Parsed(_) => AnalysisStatus::Parsed,
            AnalysisOutcome::Defaulted { .. } => AnalysisStatus::Defaulted,
        }
    }

    #[must_use]
    pub fn default_reason(&self) -> Option<DefaultReason> {
        match self {
            AnalysisOutcome::Parsed(_) => None,
            AnalysisOutcome::Defaulted { reason } => Some(*reason),
        }
    }
}

/// One record's enrichment: echoed metadata plus the analysis outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub title: String,
    pub source: String,
    pub date: String,
    pub url: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub outcome: AnalysisOutcome,
}

impl EnrichedRecord {
    /// Stamps `outcome` with metadata copied from `record` and the current time.
    #[must_use]
    pub fn from_outcome(record: &RawRecord, outcome: AnalysisOutcome) -> Self {
        Self {
            title: record.title.clone(),
            source: record.source_name.clone(),
            date: record.date.clone(),
            url: record.link.clone(),
            analysis_timestamp: Utc::now(),
            outcome,
        }
    }

    #[must_use]
    pub fn analysis(&self) -> Cow<'_, AnalysisFields> {
        self.outcome.fields()
    }
}
