pub mod classify;
pub mod client;
pub mod collect;
pub mod error;
pub mod extract;
pub mod fields;
pub mod rate_limit;

pub use classify::{utility_indicators, Classification, ContentClassifier, SourceKeywords};
pub use client::{FetchedPage, HttpFetcher};
pub use collect::scrape_source;
pub use error::{ExtractError, ScraperError};
pub use extract::{CompiledSelectors, RecordExtractor, SelectorChain};
pub use fields::{
    extract_funding_amount, extract_funding_stage, extract_thesis_tag, mentions_dollar_amount,
};
pub use rate_limit::{FetchPolicy, Pacing};
