//! Per-source scrape: fetch, extract, classify.

use gridintel_core::{RawRecord, SourceConfig};

use crate::classify::{ContentClassifier, SourceKeywords};
use crate::client::HttpFetcher;
use crate::error::ScraperError;
use crate::extract::RecordExtractor;

/// Scrapes one source into classified records.
///
/// Selectors are compiled before any request is made, so a source with an
/// invalid selector never touches the network.
///
/// # Errors
///
/// - [`ScraperError::Extract`] if the source's selectors do not compile.
/// - Any fetch error once the fetcher's attempts are exhausted.
///
/// Failures of individual articles are logged and skipped, never returned.
pub async fn scrape_source(
    fetcher: &HttpFetcher,
    classifier: &ContentClassifier,
    source: &SourceConfig,
) -> Result<Vec<RawRecord>, ScraperError> {
    tracing::info!(source = %source.name, url = %source.url, "scraping source");

    let extractor = RecordExtractor::new(source).map_err(|e| ScraperError::Extract {
        source_name: source.name.clone(),
        source: e,
    })?;

    let page = fetcher.fetch(&source.url).await?;
    tracing::debug!(
        source = %source.name,
        status = page.status,
        final_url = %page.final_url,
        bytes = page.body.len(),
        "fetched source page"
    );
    let mut records = extractor.extract(&page.body, &page.final_url);

    let extra = SourceKeywords::of(source);
    for record in &mut records {
        classifier.annotate(record, extra);
    }

    let funding = records.iter().filter(|r| r.has_funding_content).count();
    let utility = records.iter().filter(|r| r.has_utility_content).count();
    let thesis = records
        .iter()
        .filter(|r| r.has_investment_thesis_content)
        .count();
    tracing::info!(
        source = %source.name,
        extracted = records.len(),
        funding,
        utility,
        thesis,
        "extracted records from source"
    );

    Ok(records)
}
