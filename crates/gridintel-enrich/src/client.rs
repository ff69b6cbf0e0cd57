//! Per-record enrichment with a guaranteed result.

use std::time::Duration;

use gridintel_core::RawRecord;

use crate::error::EnrichError;
use crate::model::TextModel;
use crate::parse::parse_analysis;
use crate::prompt::build_prompt;
use crate::types::{AnalysisOutcome, DefaultReason, EnrichedRecord};

/// Sends records to a [`TextModel`] one at a time.
///
/// Never fails: every call returns an [`EnrichedRecord`], falling back to
/// the default analysis when the model call or its reply is unusable. Failed
/// calls are not retried.
#[derive(Debug)]
pub struct EnrichmentClient<M> {
    model: M,
    delay: Duration,
    calls: u64,
}

impl<M: TextModel> EnrichmentClient<M> {
    /// `delay` is awaited before every model call except the first.
    #[must_use]
    pub fn new(model: M, delay: Duration) -> Self {
        Self {
            model,
            delay,
            calls: 0,
        }
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Number of model calls made so far.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Enriches one record.
    pub async fn enrich(&mut self, record: &RawRecord) -> EnrichedRecord {
        if !self.model.is_enabled() {
            return EnrichedRecord::from_outcome(
                record,
                AnalysisOutcome::Defaulted {
                    reason: DefaultReason::Disabled,
                },
            );
        }

        if self.calls > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls += 1;

        let prompt = build_prompt(record);
        let outcome = match self.model.complete(&prompt).await {
            Ok(reply) => match parse_analysis(&reply) {
                Ok(fields) => AnalysisOutcome::Parsed(fields),
                Err(reason) => {
                    tracing::warn!(
                        source = %record.source_name,
                        title = %record.title,
                        %reason,
                        "could not parse model reply; using default analysis"
                    );
                    AnalysisOutcome::Defaulted { reason }
                }
            },
            Err(EnrichError::Disabled) => AnalysisOutcome::Defaulted {
                reason: DefaultReason::Disabled,
            },
            Err(e) => {
                tracing::warn!(
                    source = %record.source_name,
                    title = %record.title,
                    error = %e,
                    "model call failed; using default analysis"
                );
                AnalysisOutcome::Defaulted {
                    reason: DefaultReason::CallFailed,
                }
            }
        };

        EnrichedRecord::from_outcome(record, outcome)
    }

    /// Enriches `records` in order. The result has exactly one entry per input.
    pub async fn enrich_all(&mut self, records: &[RawRecord]) -> Vec<EnrichedRecord> {
        let total = records.len();
        let mut enriched = Vec::with_capacity(total);
        for (i, record) in records.iter().enumerate() {
            tracing::debug!(index = i + 1, total, title = %record.title, "enriching record");
            enriched.push(self.enrich(record).await);
        }
        enriched
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
