use std::collections::VecDeque;
use std::sync::Mutex;

use gridintel_core::sources::SourcesFile;
use gridintel_core::ModelProvider;
use gridintel_enrich::{AnalysisStatus, DefaultReason, EnrichError, MergedRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const ANALYSIS_REPLY: &str = r#"Here is the analysis:
{
  "investment_thesis_tag": "Energy Storage",
  "technology_readiness_level": 8,
  "regulated_asset_potential": true,
  "ny_service_territory_relevance": true,
  "grid_impact_score": 7,
  "clcpa_compliance_value": "Supports the 6 GW storage target",
  "capital_investment_required": "High",
  "implementation_timeline": "Short",
  "risk_assessment": "Low",
  "strategic_priority": "High"
}"#;

const NEWS_PAGE: &str = r#"<html><body>
<article>
  <h2>GridCo closes Series B</h2>
  <a href="/news/gridco">Read more</a>
  <span class="date">Oct 1, 2024</span>
  <p>GridCo raised $10M in Series B funding for a grid-scale battery storage project in Brooklyn, NY</p>
</article>
<article>
  <h2>Utility files rate case</h2>
  <a href="/news/rate-case">Read more</a>
  <p>The utility filed a rate case covering substation upgrades.</p>
</article>
<article>
  <h2>GridCo closes Series B</h2>
  <a href="/news/gridco">Syndicated copy</a>
  <p>Syndicated copy of the GridCo announcement.</p>
</article>
</body></html>"#;

/// Replays canned replies in order.
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, EnrichError>>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<String, EnrichError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

impl TextModel for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, EnrichError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(EnrichError::MalformedResponse {
                provider: "scripted",
                reason: "script exhausted".to_owned(),
            }))
    }
}

#[derive(Default)]
struct MemorySink {
    raw: Vec<RawRecord>,
    merged: Vec<MergedRecord>,
    summary: Option<RunSummary>,
}

impl RecordSink for MemorySink {
    type Error = std::convert::Infallible;

    fn write_raw(&mut self, records: &[RawRecord]) -> Result<(), Self::Error> {
        self.raw = records.to_vec();
        Ok(())
    }

    fn write_merged(&mut self, records: &[MergedRecord]) -> Result<(), Self::Error> {
        self.merged = records.to_vec();
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> Result<(), Self::Error> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

fn instant_fetcher() -> HttpFetcher {
    let policy = FetchPolicy {
        max_attempts: 3,
        backoff_base: Duration::ZERO,
        pacing: Pacing::none(),
    };
    HttpFetcher::new(policy, 5, "gridintel-test").unwrap()
}

fn registry(server: &MockServer) -> SourceRegistry {
    let json = format!(
        r#"{{
            "sources": {{
                "broken": {{
                    "name": "Broken Feed",
                    "url": "{base}/broken",
                    "priority": "high"
                }},
                "news": {{
                    "name": "Grid News",
                    "url": "{base}/news",
                    "category": "industry_news"
                }}
            }}
        }}"#,
        base = server.uri()
    );
    let file: SourcesFile = serde_json::from_str(&json).unwrap();
    SourceRegistry::from_file(file).unwrap()
}

fn scripted_context(replies: Vec<Result<String, EnrichError>>) -> PipelineContext<ScriptedModel> {
    PipelineContext::new(
        instant_fetcher(),
        ContentClassifier::default(),
        EnrichmentClient::new(ScriptedModel::new(replies), Duration::ZERO),
    )
}

async fn mount_sources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_PAGE))
        .expect(1)
        .mount(server)
        .await;
}

fn test_config(sources_path: PathBuf, output_dir: PathBuf) -> (AppConfig, RunOptions) {
    let config = AppConfig {
        sources_path: sources_path.clone(),
        output_dir: output_dir.clone(),
        log_level: "info".to_string(),
        request_timeout_secs: 5,
        user_agent: "gridintel-test".to_string(),
        max_attempts: 3,
        request_delay_min_ms: 0,
        request_delay_max_ms: 0,
        retry_backoff_base_ms: 0,
        model_provider: ModelProvider::Disabled,
        model: "none".to_string(),
        model_base_url: None,
        model_api_key: None,
        enrich_delay_ms: 0,
        enrich_timeout_secs: 5,
    };
    let options = RunOptions {
        sources_path,
        output_dir,
    };
    (config, options)
}

#[tokio::test]
async fn failing_source_does_not_stop_the_run() {
    let server = MockServer::start().await;
    mount_sources(&server).await;
    let registry = registry(&server);

    let mut context = scripted_context(vec![
        Ok(ANALYSIS_REPLY.to_string()),
        Ok("I cannot help with that.".to_string()),
    ]);
    let mut sink = MemorySink::default();
    let report = context.run(&registry, &mut sink).await.unwrap();

    assert_eq!(report.sources_total, 2);
    assert_eq!(report.sources_failed, 1);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.raw_records, 2);
    assert_eq!(report.parsed_records, 1);
    assert_eq!(report.defaulted_records, 1);

    assert_eq!(sink.raw.len(), 2);
    assert!(sink.raw.iter().all(|r| r.source_name == "Grid News"));
    assert_eq!(sink.merged.len(), sink.raw.len());
}

#[tokio::test]
async fn records_carry_classification_and_analysis() {
    let server = MockServer::start().await;
    mount_sources(&server).await;
    let registry = registry(&server);

    let mut context = scripted_context(vec![
        Ok(ANALYSIS_REPLY.to_string()),
        Ok("no json here".to_string()),
    ]);
    let mut sink = MemorySink::default();
    context.run(&registry, &mut sink).await.unwrap();

    let gridco = &sink.merged[0];
    assert_eq!(gridco.title, "GridCo closes Series B");
    assert_eq!(gridco.link, format!("{}/news/gridco", server.uri()));
    assert!(gridco.has_funding_content);
    assert!(gridco.has_utility_content);
    assert_eq!(gridco.funding_amount.as_deref(), Some("$10M"));
    assert_eq!(gridco.funding_stage.as_deref(), Some("Series B"));
    assert_eq!(gridco.analysis_status, AnalysisStatus::Parsed);
    assert_eq!(gridco.analysis.technology_readiness_level, 8);
    assert_eq!(gridco.analysis.investment_thesis_tag, "Energy Storage");

    let rate_case = &sink.merged[1];
    assert_eq!(rate_case.analysis_status, AnalysisStatus::Defaulted);
    assert_eq!(rate_case.default_reason, Some(DefaultReason::NoJsonSpan));
    assert_eq!(rate_case.analysis, gridintel_enrich::default_analysis());

    let summary = sink.summary.expect("summary written");
    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.high_priority_opportunities, 1);
    assert_eq!(summary.funding_records, 1);
}

#[tokio::test]
async fn every_source_failing_still_writes_empty_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&server)
        .await;
    let registry = registry(&server);

    let mut context = scripted_context(vec![]);
    let mut sink = MemorySink::default();
    let report = context.run(&registry, &mut sink).await.unwrap();

    assert_eq!(report.sources_failed, 2);
    assert!(sink.raw.is_empty());
    assert!(sink.merged.is_empty());
    assert_eq!(sink.summary.expect("summary written").total_records, 0);
    assert_eq!(context.enricher.calls(), 0);
}

#[tokio::test]
async fn missing_sources_file_fails_before_creating_output() {
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("out");
    let (config, options) = test_config(tmp.path().join("missing.json"), output_dir.clone());

    let result = run(&config, &options).await;

    let err = result.expect_err("missing sources file must abort the run");
    assert!(err.to_string().contains("failed to read sources file"));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn disabled_run_writes_files_to_output_dir() {
    let server = MockServer::start().await;
    mount_sources(&server).await;

    let tmp = tempfile::tempdir().unwrap();
    let sources_path = tmp.path().join("sources.json");
    let sources = serde_json::json!({
        "sources": {
            "news": { "name": "Grid News", "url": format!("{}/news", server.uri()) },
            "broken": { "name": "Broken Feed", "url": format!("{}/broken", server.uri()) }
        }
    });
    std::fs::write(&sources_path, sources.to_string()).unwrap();
    let output_dir = tmp.path().join("out");
    let (config, options) = test_config(sources_path, output_dir.clone());

    let report = run(&config, &options).await.unwrap();

    assert_eq!(report.sources_failed, 1);
    assert_eq!(report.parsed_records, 0);
    assert_eq!(report.defaulted_records, 2);
    for name in [
        crate::output::RAW_FILE,
        crate::output::ANALYZED_FILE,
        crate::output::ANALYZED_ROWS_FILE,
        crate::output::SUMMARY_FILE,
    ] {
        assert!(output_dir.join(name).is_file(), "{name} not written");
    }
}

#[test]
fn fetch_policy_follows_config() {
    let tmp = PathBuf::from("unused");
    let (mut config, _) = test_config(tmp.clone(), tmp);
    config.max_attempts = 4;
    config.retry_backoff_base_ms = 250;
    config.request_delay_min_ms = 100;
    config.request_delay_max_ms = 300;

    let policy = fetch_policy(&config);
    assert_eq!(policy.max_attempts, 4);
    assert_eq!(policy.backoff_base, Duration::from_millis(250));
    assert_eq!(policy.pacing.min(), Duration::from_millis(100));
    assert_eq!(policy.pacing.max(), Duration::from_millis(300));
}

#[test]
fn report_display_counts_successful_sources() {
    let report = RunReport {
        run_id: Uuid::nil(),
        sources_total: 5,
        sources_failed: 2,
        raw_records: 12,
        duplicates_removed: 1,
        parsed_records: 10,
        defaulted_records: 2,
    };
    let text = report.to_string();
    assert!(text.contains("3/5 sources ok"));
    assert!(text.contains("12 records (1 duplicates removed)"));
}
