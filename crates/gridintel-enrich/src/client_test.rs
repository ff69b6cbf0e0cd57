use std::collections::VecDeque;
use std::sync::Mutex;

use super::*;
use crate::types::{default_analysis, StrategicPriority};

/// Replays canned replies in order; errors once exhausted.
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

struct DisabledModel;

impl TextModel for DisabledModel {
    async fn complete(&self, _prompt: &str) -> Result<String, EnrichError> {
        panic!("disabled model must not be called");
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

const REPLY: &str = r#"Sure! {"investment_thesis_tag": "Energy Storage", "technology_readiness_level": "8",
 "regulated_asset_potential": "yes", "ny_service_territory_relevance": true, "grid_impact_score": 7,
 "clcpa_compliance_value": "Storage target", "capital_investment_required": "High",
 "implementation_timeline": "Short term", "risk_assessment": "Low", "strategic_priority": "High"}"#;

fn record(title: &str) -> RawRecord {
    RawRecord::new(
        "Canary Media",
        "https://www.canarymedia.com/articles",
        "industry_news",
        title.to_string(),
        format!("https://www.canarymedia.com/articles/{}", title.to_lowercase()),
        "Oct 1, 2024".to_string(),
        "Battery storage in Queens.".to_string(),
    )
    .unwrap()
}

#[tokio::test]
async fn parsed_reply_yields_parsed_outcome_with_metadata() {
    let mut client = EnrichmentClient::new(ScriptedModel::new(vec![Ok(REPLY.to_owned())]), Duration::ZERO);
    let raw = record("Storage");
    let enriched = client.enrich(&raw).await;

    let AnalysisOutcome::Parsed(fields) = &enriched.outcome else {
        panic!("expected Parsed, got {:?}", enriched.outcome);
    };
    assert_eq!(fields.technology_readiness_level, 8);
    assert!(fields.regulated_asset_potential);
    assert_eq!(fields.strategic_priority, StrategicPriority::High);
    assert_eq!(enriched.title, "Storage");
    assert_eq!(enriched.source, "Canary Media");
    assert_eq!(enriched.date, "Oct 1, 2024");
    assert_eq!(enriched.url, raw.link);
}

#[tokio::test]
async fn reply_without_json_defaults_but_keeps_metadata() {
    let mut client = EnrichmentClient::new(
        ScriptedModel::new(vec![Ok("I'm unable to help with that.".to_owned())]),
        Duration::ZERO,
    );
    let raw = record("Storage");
    let enriched = client.enrich(&raw).await;

    assert_eq!(
        enriched.outcome,
        AnalysisOutcome::Defaulted {
            reason: DefaultReason::NoJsonSpan
        }
    );
    assert_eq!(enriched.analysis().into_owned(), default_analysis());
    assert_eq!(enriched.title, raw.title);
    assert_eq!(enriched.source, raw.source_name);
    assert_eq!(enriched.date, raw.date);
    assert_eq!(enriched.url, raw.link);
}

#[tokio::test]
async fn call_failure_defaults_with_call_failed() {
    let mut client = EnrichmentClient::new(
        ScriptedModel::new(vec![Err(EnrichError::Status {
            provider: "scripted",
            status: 503,
            body: String::new(),
        })]),
        Duration::ZERO,
    );
    let enriched = client.enrich(&record("Storage")).await;
    assert_eq!(enriched.outcome.default_reason(), Some(DefaultReason::CallFailed));
}

#[tokio::test]
async fn enrich_all_is_one_to_one_across_mixed_outcomes() {
    let mut client = EnrichmentClient::new(
        ScriptedModel::new(vec![
            Ok(REPLY.to_owned()),
            Ok("{ not json".to_owned()),
            Err(EnrichError::Disabled),
            Ok("{\"investment_thesis_tag\": \"x\"}".to_owned()),
        ]),
        Duration::ZERO,
    );
    let raws: Vec<RawRecord> = ["A", "B", "C", "D", "E"].iter().map(|t| record(t)).collect();
    let enriched = client.enrich_all(&raws).await;

    assert_eq!(enriched.len(), raws.len());
    let reasons: Vec<Option<DefaultReason>> =
        enriched.iter().map(|e| e.outcome.default_reason()).collect();
    assert_eq!(
        reasons,
        vec![
            None,
            Some(DefaultReason::NoJsonSpan),
            Some(DefaultReason::Disabled),
            Some(DefaultReason::SchemaMismatch),
            Some(DefaultReason::CallFailed),
        ]
    );
    let titles: Vec<&str> = enriched.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C", "D", "E"]);
    assert_eq!(client.calls(), 5);
}

#[tokio::test]
async fn disabled_model_is_never_called() {
    let mut client = EnrichmentClient::new(DisabledModel, Duration::from_secs(3600));
    let enriched = client.enrich_all(&[record("A"), record("B")]).await;
    assert!(enriched
        .iter()
        .all(|e| e.outcome.default_reason() == Some(DefaultReason::Disabled)));
    assert_eq!(client.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn delay_applies_between_calls_not_before_first() {
    let replies = (0..3).map(|_| Ok(REPLY.to_owned())).collect();
    let mut client = EnrichmentClient::new(ScriptedModel::new(replies), Duration::from_millis(1000));

    let started = tokio::time::Instant::now();
    client.enrich(&record("A")).await;
    assert_eq!(started.elapsed(), Duration::ZERO);

    client.enrich_all(&[record("B"), record("C")]).await;
    assert_eq!(started.elapsed(), Duration::from_millis(2000));
}
