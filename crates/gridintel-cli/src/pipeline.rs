//! One end-to-end run: scrape every source, dedup, enrich, aggregate,
//! summarize, and hand the results to a sink.
//!
//! Sources are processed strictly one after another in priority order, and
//! records are enriched one at a time. A source that fails is logged and
//! skipped; only configuration and sink errors abort the run.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use gridintel_core::{load_sources, AppConfig, RawRecord, SourceRegistry};
use gridintel_enrich::{
    aggregate_all, dedup_raw, EnrichmentClient, ModelBackend, RecordSink, RunSummary, TextModel,
};
use gridintel_scraper::{scrape_source, ContentClassifier, FetchPolicy, HttpFetcher, Pacing};
use tracing::Instrument;
use uuid::Uuid;

use crate::output::JsonFileSink;

/// Paths for one run, after command-line overrides are applied.
#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub sources_path: PathBuf,
    pub output_dir: PathBuf,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunReport {
    pub run_id: Uuid,
    pub sources_total: usize,
    pub sources_failed: usize,
    pub raw_records: usize,
    pub duplicates_removed: usize,
    pub parsed_records: usize,
    pub defaulted_records: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {}/{} sources ok, {} records ({} duplicates removed), {} analyzed, {} defaulted",
            self.run_id,
            self.sources_total - self.sources_failed,
            self.sources_total,
            self.raw_records,
            self.duplicates_removed,
            self.parsed_records,
            self.defaulted_records,
        )
    }
}

/// Everything a run needs, built once and passed to each stage.
pub(crate) struct PipelineContext<M> {
    fetcher: HttpFetcher,
    classifier: ContentClassifier,
    enricher: EnrichmentClient<M>,
}

/// Fetch policy described by the runtime configuration.
pub(crate) fn fetch_policy(config: &AppConfig) -> FetchPolicy {
    FetchPolicy {
        max_attempts: config.max_attempts,
        backoff_base: Duration::from_millis(config.retry_backoff_base_ms),
        pacing: Pacing::between(
            Duration::from_millis(config.request_delay_min_ms),
            Duration::from_millis(config.request_delay_max_ms),
        ),
    }
}

/// Loads the sources, builds the context, and runs the pipeline into a
/// [`JsonFileSink`] under `options.output_dir`.
///
/// # Errors
///
/// Fails before any request is made if the sources file is missing or
/// invalid, the output directory cannot be created, or a client cannot be
/// built. Afterwards only sink write errors are returned.
pub(crate) async fn run(config: &AppConfig, options: &RunOptions) -> anyhow::Result<RunReport> {
    let registry = load_sources(&options.sources_path)?;
    let mut sink = JsonFileSink::create(&options.output_dir)?;

    let fetcher = HttpFetcher::new(
        fetch_policy(config),
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let classifier = ContentClassifier::from_categories(registry.analysis_categories());
    let model = ModelBackend::from_config(config)?;
    tracing::info!(
        provider = model.name(),
        model = %config.model,
        sources = registry.len(),
        "pipeline configured"
    );
    let enricher = EnrichmentClient::new(model, Duration::from_millis(config.enrich_delay_ms));

    let mut context = PipelineContext::new(fetcher, classifier, enricher);
    context.run(&registry, &mut sink).await
}

impl<M: TextModel> PipelineContext<M> {
    pub(crate) fn new(
        fetcher: HttpFetcher,
        classifier: ContentClassifier,
        enricher: EnrichmentClient<M>,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            enricher,
        }
    }

    /// Scrapes every source in priority order. Returns the records collected
    /// and the number of sources that failed.
    pub(crate) async fn collect(&self, registry: &SourceRegistry) -> (Vec<RawRecord>, usize) {
        let mut records = Vec::new();
        let mut failed = 0usize;

        for source in registry.by_priority() {
            match scrape_source(&self.fetcher, &self.classifier, source).await {
                Ok(found) => records.extend(found),
                Err(e) => {
                    tracing::warn!(
                        source = %source.name,
                        url = %source.url,
                        error = %e,
                        "source failed; skipping"
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            tracing::warn!(
                failed_sources = failed,
                total_sources = registry.len(),
                "some sources failed during collection"
            );
        }
        (records, failed)
    }

    /// Runs every stage for `registry` and writes the results to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if any write fails.
    pub(crate) async fn run<S: RecordSink>(
        &mut self,
        registry: &SourceRegistry,
        sink: &mut S,
    ) -> anyhow::Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);

        async {
            tracing::info!(sources = registry.len(), "run started");

            let (collected, sources_failed) = self.collect(registry).await;
            let (raw, duplicates_removed) = dedup_raw(collected);
            if duplicates_removed > 0 {
                tracing::info!(duplicates_removed, "dropped duplicate records");
            }
            sink.write_raw(&raw)?;

            let enriched = self.enricher.enrich_all(&raw).await;
            let raw_records = raw.len();
            let merged = aggregate_all(raw, enriched);
            sink.write_merged(&merged)?;

            let summary = RunSummary::from_records(&merged);
            sink.write_summary(&summary)?;

            tracing::info!(
                records = summary.total_records,
                parsed = summary.parsed_records,
                defaulted = summary.defaulted_records,
                high_priority = summary.high_priority_opportunities,
                model_calls = self.enricher.calls(),
                "run complete"
            );

            Ok::<_, anyhow::Error>(RunReport {
                run_id,
                sources_total: registry.len(),
                sources_failed,
                raw_records,
                duplicates_removed,
                parsed_records: summary.parsed_records,
                defaulted_records: summary.defaulted_records,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
