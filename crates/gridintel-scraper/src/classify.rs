//! Keyword classification of record text.
//!
//! All matching is case-insensitive substring search. The classifier holds
//! no mutable state, so classifying the same text twice yields the same flags.

use gridintel_core::{AnalysisCategories, RawRecord, SourceConfig, UtilityIndicators};

use crate::fields::{
    extract_funding_amount, extract_funding_stage, extract_thesis_tag, mentions_dollar_amount,
};

pub const DEFAULT_FUNDING_KEYWORDS: &[&str] = &[
    "funding",
    "raised",
    "raises",
    "investment",
    "investor",
    "venture capital",
    "seed round",
    "series a",
    "series b",
    "series c",
    "grant",
    "financing",
];

pub const DEFAULT_UTILITY_KEYWORDS: &[&str] = &[
    "grid",
    "transmission",
    "distribution",
    "utility",
    "power",
    "electricity",
    "infrastructure",
    "substation",
    "smart grid",
    "reliability",
    "resilience",
    "modernization",
    "upgrade",
    "con edison",
    "coned",
    "nyc",
    "new york",
    "westchester",
    "clcpa",
    "climate",
    "renewable",
    "solar",
    "wind",
    "storage",
    "battery",
    "microgrid",
    "demand response",
    "peak load",
];

pub const DEFAULT_THESIS_TAGS: &[&str] = &[
    "Grid Reliability",
    "Peak Load Reduction",
    "Transmission Decongestion",
    "Electrification of Heat/Transport",
    "Storm Hardening",
    "Regulatory Compliance (CLCPA)",
    "Demand Response",
    "Energy Storage",
    "Smart Grid Technology",
];

const REGULATED_ASSET_KEYWORDS: &[&str] = &[
    "infrastructure",
    "grid asset",
    "capital investment",
    "long-term asset",
    "rate base",
];

const NY_TERRITORY_KEYWORDS: &[&str] = &[
    "nyc",
    "new york",
    "manhattan",
    "brooklyn",
    "queens",
    "bronx",
    "staten island",
    "westchester",
];

/// Boolean content flags for one piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub has_funding: bool,
    pub has_utility: bool,
    pub has_thesis: bool,
}

/// Per-source keyword additions, borrowed from a [`SourceConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceKeywords<'a> {
    pub funding: &'a [String],
    pub utility: &'a [String],
    pub thesis: &'a [String],
}

impl<'a> SourceKeywords<'a> {
    #[must_use]
    pub fn of(source: &'a SourceConfig) -> Self {
        Self {
            funding: &source.funding_keywords,
            utility: &source.utility_keywords,
            thesis: &source.thesis_keywords,
        }
    }
}

/// Global keyword vocabularies plus the matching rules applied to them.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    funding: Vec<String>,
    utility: Vec<String>,
    thesis_tags: Vec<String>,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::from_categories(&AnalysisCategories::default())
    }
}

impl ContentClassifier {
    /// Builds a classifier from the configured vocabularies. Each empty list
    /// is replaced by its built-in default.
    #[must_use]
    pub fn from_categories(categories: &AnalysisCategories) -> Self {
        Self {
            funding: vocabulary(&categories.funding_keywords, DEFAULT_FUNDING_KEYWORDS),
            utility: vocabulary(&categories.utility_keywords, DEFAULT_UTILITY_KEYWORDS),
            thesis_tags: vocabulary(&categories.investment_thesis_tags, DEFAULT_THESIS_TAGS),
        }
    }

    #[must_use]
    pub fn thesis_tags(&self) -> &[String] {
        &self.thesis_tags
    }

    /// Flags `text` against the global vocabularies unioned with `extra`.
    /// Funding is additionally flagged by any dollar amount.
    #[must_use]
    pub fn classify(&self, text: &str, extra: SourceKeywords<'_>) -> Classification {
        let lower = text.to_lowercase();
        Classification {
            has_funding: contains_any(&lower, &self.funding)
                || contains_any(&lower, extra.funding)
                || mentions_dollar_amount(text),
            has_utility: contains_any(&lower, &self.utility) || contains_any(&lower, extra.utility),
            has_thesis: contains_any(&lower, &self.thesis_tags)
                || contains_any(&lower, extra.thesis),
        }
    }

    /// Fills the heuristic fields of `record` from its title and content.
    ///
    /// Amount and stage are only looked for when funding content was
    /// detected; the thesis tag only when thesis content was.
    pub fn annotate(&self, record: &mut RawRecord, extra: SourceKeywords<'_>) {
        let text = record.classification_text();
        let flags = self.classify(&text, extra);

        record.has_funding_content = flags.has_funding;
        record.has_utility_content = flags.has_utility;
        record.has_investment_thesis_content = flags.has_thesis;

        if flags.has_funding {
            record.funding_amount = extract_funding_amount(&text);
            record.funding_stage = extract_funding_stage(&text);
        }
        if flags.has_thesis {
            record.investment_thesis = extract_thesis_tag(&text, &self.thesis_tags)
                .or_else(|| extract_thesis_tag(&text, extra.thesis));
        }

        let indicators = utility_indicators(&text);
        record.regulated_asset_potential = Some(indicators.regulated_asset_potential);
        record.ny_service_territory_relevance = Some(indicators.ny_service_territory_relevance);
    }
}

/// Regulated-asset and New York territory hints in `text`.
#[must_use]
pub fn utility_indicators(text: &str) -> UtilityIndicators {
    let lower = text.to_lowercase();
    UtilityIndicators {
        regulated_asset_potential: contains_any(&lower, REGULATED_ASSET_KEYWORDS),
        ny_service_territory_relevance: contains_any(&lower, NY_TERRITORY_KEYWORDS),
    }
}

fn vocabulary(configured: &[String], builtin: &[&str]) -> Vec<String> {
    if configured.is_empty() {
        builtin.iter().map(|s| (*s).to_owned()).collect()
    } else {
        configured.to_vec()
    }
}

/// `lower` must already be lowercased; keywords are lowercased here.
fn contains_any<S: AsRef<str>>(lower: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| {
        let k = k.as_ref();
        !k.is_empty() && lower.contains(&k.to_lowercase())
    })
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
