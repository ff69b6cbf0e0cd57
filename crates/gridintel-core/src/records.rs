use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heuristic utility indicators derived from a record's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityIndicators {
    pub regulated_asset_potential: bool,
    pub ny_service_territory_relevance: bool,
}

/// A content record extracted from a source page, before enrichment.
///
/// Created by the record extractor with title/link/date/content filled and the
/// heuristic fields empty; the classifier then fills flags and extracted fields.
/// A record is never created with both `title` and `content` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub source_name: String,
    pub source_url: String,
    pub title: String,
    /// Absolute URL, or empty when the element carried no usable link.
    pub link: String,
    /// Free-form date text as it appeared on the page.
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
    pub regulated_asset_potential: Option<bool>,
    pub ny_service_territory_relevance: Option<bool>,
}

impl RawRecord {
    /// Builds an unclassified record. Returns `None` when both `title` and
    /// `content` are blank.
    #[must_use]
    pub fn new(
        source_name: &str,
        source_url: &str,
        category: &str,
        title: String,
        link: String,
        date: String,
        content: String,
    ) -> Option<Self> {
        if title.trim().is_empty() && content.trim().is_empty() {
            return None;
        }
        Some(Self {
            source_name: source_name.to_string(),
            source_url: source_url.to_string(),
            title,
            link,
            date,
            content,
            category: category.to_string(),
            scraped_at: Utc::now(),
            has_funding_content: false,
            has_utility_content: false,
            has_investment_thesis_content: false,
            funding_amount: None,
            funding_stage: None,
            investment_thesis: None,
            regulated_asset_potential: None,
            ny_service_territory_relevance: None,
        })
    }

    /// Text used for keyword classification: title and content joined by a space.
    #[must_use]
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    /// Identity used for within-run deduplication. `None` when the record has no link.
    #[must_use]
    pub fn identity(&self) -> Option<(&str, &str)> {
        if self.link.is_empty() {
            None
        } else {
            Some((self.source_name.as_str(), self.link.as_str()))
        }
    }
}
