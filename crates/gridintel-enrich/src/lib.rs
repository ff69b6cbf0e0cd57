//! Enrichment of scraped records through a remote text model.
//!
//! Builds an analysis prompt per record, parses the model's JSON reply into a
//! fixed ten-field schema, and falls back to a default analysis whenever the
//! call or the reply is unusable. Also merges raw and enriched records and
//! computes run statistics.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod sink;
pub mod summary;
pub mod types;

pub use aggregate::{aggregate, aggregate_all, dedup_raw, MergedRecord};
pub use client::EnrichmentClient;
pub use error::EnrichError;
pub use model::{GeminiModel, ModelBackend, OpenAiChat, TextModel};
pub use parse::{json_span, parse_analysis};
pub use prompt::build_prompt;
pub use sink::RecordSink;
pub use summary::RunSummary;
pub use types::{
    default_analysis, AnalysisFields, AnalysisOutcome, AnalysisStatus, CapitalInvestment,
    DefaultReason, EnrichedRecord, RiskLevel, StrategicPriority, Timeline,
};
