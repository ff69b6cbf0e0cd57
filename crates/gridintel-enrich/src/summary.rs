//! Run-level statistics over merged records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::MergedRecord;
use crate::types::{AnalysisStatus, StrategicPriority};

/// TRL at or above which a technology counts as commercially ready.
pub const HIGH_TRL_THRESHOLD: i64 = 7;

/// Summary statistics for one run.
///
/// Analysis distributions and opportunity counts cover parsed records only,
/// so default placeholders never show up as real assessments. The raw
/// heuristic counts cover every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub parsed_records: usize,
    pub defaulted_records: usize,
    pub records_by_source: BTreeMap<String, usize>,
    pub investment_thesis_distribution: BTreeMap<String, usize>,
    pub technology_readiness_distribution: BTreeMap<i64, usize>,
    pub strategic_priority_distribution: BTreeMap<String, usize>,
    pub high_priority_opportunities: usize,
    pub regulated_asset_opportunities: usize,
    pub ny_relevant_opportunities: usize,
    pub high_trl_opportunities: usize,
    pub funding_records: usize,
    pub utility_records: usize,
    pub thesis_records: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_records(records: &[MergedRecord]) -> Self {
        let mut summary = Self {
            generated_at: Utc::now(),
            total_records: records.len(),
            parsed_records: 0,
            defaulted_records: 0,
            records_by_source: BTreeMap::new(),
            investment_thesis_distribution: BTreeMap::new(),
            technology_readiness_distribution: BTreeMap::new(),
            strategic_priority_distribution: BTreeMap::new(),
            high_priority_opportunities: 0,
            regulated_asset_opportunities: 0,
            ny_relevant_opportunities: 0,
            high_trl_opportunities: 0,
            funding_records: 0,
            utility_records: 0,
            thesis_records: 0,
        };

        for record in records {
            *summary
                .records_by_source
                .entry(record.source_name.clone())
                .or_default() += 1;
            summary.funding_records += usize::from(record.has_funding_content);
            summary.utility_records += usize::from(record.has_utility_content);
            summary.thesis_records += usize::from(record.has_investment_thesis_content);

            if record.analysis_status == AnalysisStatus::Defaulted {
                summary.defaulted_records += 1;
                continue;
            }
            summary.parsed_records += 1;

            let analysis = &record.analysis;
            *summary
                .investment_thesis_distribution
                .entry(analysis.investment_thesis_tag.clone())
                .or_default() += 1;
            *summary
                .technology_readiness_distribution
                .entry(analysis.technology_readiness_level)
                .or_default() += 1;
            *summary
                .strategic_priority_distribution
                .entry(analysis.strategic_priority.to_string())
                .or_default() += 1;

            if analysis.strategic_priority == StrategicPriority::High {
                summary.high_priority_opportunities += 1;
            }
            if analysis.regulated_asset_potential {
                summary.regulated_asset_opportunities += 1;
            }
            if analysis.ny_service_territory_relevance {
                summary.ny_relevant_opportunities += 1;
            }
            if analysis.technology_readiness_level >= HIGH_TRL_THRESHOLD {
                summary.high_trl_opportunities += 1;
            }
        }

        summary
    }
}
