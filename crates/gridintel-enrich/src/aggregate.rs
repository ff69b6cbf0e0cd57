//! Merging raw and enriched records into output rows.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use gridintel_core::RawRecord;
use serde::{Deserialize, Serialize};

use crate::types::{
    AnalysisFields, AnalysisOutcome, AnalysisStatus, DefaultReason, EnrichedRecord,
};

/// One output row: the raw record's fields with the enrichment laid over
/// them.
///
/// Where both sides carry a field (`title`, `date`,
/// `regulated_asset_potential`, `ny_service_territory_relevance`) the
/// enriched value is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub source_name: String,
    pub source_url: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub content: String,
    pub category: String,
    pub scraped_at: DateTime<Utc>,
    pub has_funding_content: bool,
    pub has_utility_content: bool,
    pub has_investment_thesis_content: bool,
    pub funding_amount: Option<String>,
    pub funding_stage: Option<String>,
    pub investment_thesis: Option<String>,
    #[serde(flatten)]
    pub analysis: AnalysisFields,
    pub source: String,
    pub url: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub analysis_status: AnalysisStatus,
    pub default_reason: Option<DefaultReason>,
}

/// Merges one raw record with its enrichment.
#[must_use]
pub fn aggregate(raw: RawRecord, enriched: EnrichedRecord) -> MergedRecord {
    let analysis_status = enriched.outcome.status();
    let default_reason = enriched.outcome.default_reason();

    MergedRecord {
        source_name: raw.source_name,
        source_url: raw.source_url,
        title: enriched.title,
        link: raw.link,
        date: enriched.date,
        content: raw.content,
        category: raw.category,
        scraped_at: raw.scraped_at,
        has_funding_content: raw.has_funding_content,
        has_utility_content: raw.has_utility_content,
        has_investment_thesis_content: raw.has_investment_thesis_content,
        funding_amount: raw.funding_amount,
        funding_stage: raw.funding_stage,
        investment_thesis: raw.investment_thesis,
        analysis: enriched.outcome.into_fields(),
        source: enriched.source,
        url: enriched.url,
        analysis_timestamp: enriched.analysis_timestamp,
        analysis_status,
        default_reason,
    }
}

/// Merges records pairwise, in order.
///
/// The output always has one row per raw record. A raw record with no
/// matching enrichment is merged with a `CallFailed` default; surplus
/// enrichments are dropped.
#[must_use]
pub fn aggregate_all(raw: Vec<RawRecord>, enriched: Vec<EnrichedRecord>) -> Vec<MergedRecord> {
    if raw.len() != enriched.len() {
        tracing::warn!(
            raw = raw.len(),
            enriched = enriched.len(),
            "raw and enriched record counts differ"
        );
    }

    let mut enriched = enriched.into_iter();
    raw.into_iter()
        .map(|record| {
            let enrichment = enriched.next().unwrap_or_else(|| {
                EnrichedRecord::from_outcome(
                    &record,
                    AnalysisOutcome::Defaulted {
                        reason: DefaultReason::CallFailed,
                    },
                )
            });
            aggregate(record, enrichment)
        })
        .collect()
}

/// Drops records whose `(source_name, link)` was already seen in this run,
/// keeping the first. Records without a link are always kept.
///
/// Returns the surviving records and the number removed.
#[must_use]
pub fn dedup_raw(records: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
    let before = records.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let kept: Vec<RawRecord> = records
        .into_iter()
        .filter(|r| match r.identity() {
            Some((source, link)) => seen.insert((source.to_owned(), link.to_owned())),
            None => true,
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
