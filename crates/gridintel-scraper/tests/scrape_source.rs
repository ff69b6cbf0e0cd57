//! Integration tests for `scrape_source`: fetch, extract, and classify one
//! source against a `wiremock` server.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gridintel_core::{Priority, SelectorMap, SourceConfig};
use gridintel_scraper::{
    scrape_source, ContentClassifier, ExtractError, FetchPolicy, HttpFetcher, Pacing,
    ScraperError,
};

const LISTING: &str = r#"
<html><body>
  <div class="story">
    <h2>GridCo closes Series B</h2>
    <a href="/stories/gridco">Read</a>
    <span class="date">Oct 3, 2024</span>
    <p class="summary">GridCo raised $10M in Series B funding for a grid-scale battery storage project in Brooklyn, NY</p>
  </div>
  <div class="story">
    <h2>Museum opens new wing</h2>
    <a href="/stories/museum">Read</a>
    <p class="summary">An arts story with no relevant keywords.</p>
  </div>
</body></html>
"#;

fn test_fetcher() -> HttpFetcher {
    let policy = FetchPolicy {
        max_attempts: 3,
        backoff_base: Duration::ZERO,
        pacing: Pacing::none(),
    };
    HttpFetcher::new(policy, 5, "gridintel-test/0.1").expect("failed to build test HttpFetcher")
}

fn source(url: String, articles: &str) -> SourceConfig {
    SourceConfig {
        key: "example".to_string(),
        name: "Example Grid News".to_string(),
        url,
        selectors: SelectorMap {
            articles: articles.to_string(),
            content: ".summary, p".to_string(),
            ..SelectorMap::default()
        },
        category: "startup_news".to_string(),
        priority: Priority::High,
        funding_keywords: vec![],
        utility_keywords: vec![],
        thesis_keywords: vec![],
        max_articles: None,
    }
}

#[tokio::test]
async fn scrape_source_extracts_and_classifies_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .expect(1)
        .mount(&server)
        .await;

    let src = source(format!("{}/news", server.uri()), ".story");
    let records = scrape_source(&test_fetcher(), &ContentClassifier::default(), &src)
        .await
        .expect("scrape should succeed");

    assert_eq!(records.len(), 2);

    let gridco = &records[0];
    assert_eq!(gridco.title, "GridCo closes Series B");
    assert_eq!(gridco.link, format!("{}/stories/gridco", server.uri()));
    assert_eq!(gridco.date, "Oct 3, 2024");
    assert_eq!(gridco.source_name, "Example Grid News");
    assert!(gridco.has_funding_content);
    assert!(gridco.has_utility_content);
    assert_eq!(gridco.funding_amount.as_deref(), Some("$10M"));
    assert_eq!(gridco.funding_stage.as_deref(), Some("Series B"));
    assert_eq!(gridco.ny_service_territory_relevance, Some(true));

    let museum = &records[1];
    assert!(!museum.has_funding_content);
    assert!(!museum.has_utility_content);
    assert!(museum.funding_amount.is_none());
    assert_eq!(museum.ny_service_territory_relevance, Some(false));
}

#[tokio::test]
async fn scrape_source_fails_after_exhausting_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let src = source(format!("{}/news", server.uri()), ".story");
    let result = scrape_source(&test_fetcher(), &ContentClassifier::default(), &src).await;

    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn scrape_source_with_invalid_selector_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .expect(0)
        .mount(&server)
        .await;

    let src = source(format!("{}/news", server.uri()), "div[");
    let result = scrape_source(&test_fetcher(), &ContentClassifier::default(), &src).await;

    assert!(
        matches!(
            result,
            Err(ScraperError::Extract {
                source: ExtractError::InvalidSelector { .. },
                ..
            })
        ),
        "expected InvalidSelector, got: {result:?}"
    );
}
