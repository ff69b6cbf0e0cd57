use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

pub const DEFAULT_ARTICLES_SELECTOR: &str = "article, .post, .news-item, .article";
pub const DEFAULT_TITLE_SELECTOR: &str = "h1, h2, h3, .title";
pub const DEFAULT_LINK_SELECTOR: &str = "a";
pub const DEFAULT_DATE_SELECTOR: &str = ".date, .published, time";
pub const DEFAULT_CONTENT_SELECTOR: &str = ".content, .description, .summary, .body, p";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// CSS selectors used to pull records out of a source page.
///
/// Each value may be a comma-separated group; field selectors are treated as
/// an ordered fallback chain by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMap {
    #[serde(default = "default_articles")]
    pub articles: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_link")]
    pub link: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default = "default_content")]
    pub content: String,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            articles: default_articles(),
            title: default_title(),
            link: default_link(),
            date: default_date(),
            content: default_content(),
        }
    }
}

fn default_articles() -> String {
    DEFAULT_ARTICLES_SELECTOR.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE_SELECTOR.to_string()
}

fn default_link() -> String {
    DEFAULT_LINK_SELECTOR.to_string()
}

fn default_date() -> String {
    DEFAULT_DATE_SELECTOR.to_string()
}

fn default_content() -> String {
    DEFAULT_CONTENT_SELECTOR.to_string()
}

fn default_category() -> String {
    "other".to_string()
}

/// Fetch and extraction parameters for one configured source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Key of this source in the `sources` mapping. Filled in while loading.
    #[serde(skip)]
    pub key: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub selectors: SelectorMap,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub funding_keywords: Vec<String>,
    #[serde(default)]
    pub utility_keywords: Vec<String>,
    #[serde(default)]
    pub thesis_keywords: Vec<String>,
    /// Upper bound on candidate elements examined per page. `None` is unbounded.
    #[serde(default)]
    pub max_articles: Option<usize>,
}

/// Global keyword vocabularies shared by every source.
///
/// Empty lists mean "use the built-in vocabulary".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisCategories {
    #[serde(default)]
    pub funding_keywords: Vec<String>,
    #[serde(default)]
    pub utility_keywords: Vec<String>,
    #[serde(default)]
    pub investment_thesis_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub analysis_categories: AnalysisCategories,
    #[serde(deserialize_with = "ordered_sources")]
    pub sources: Vec<SourceConfig>,
}

/// Deserializes the `sources` mapping into a `Vec`, keeping declaration
/// order and every entry (duplicates included, so validation can report them).
fn ordered_sources<'de, D>(deserializer: D) -> Result<Vec<SourceConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedSources;

    impl<'de> Visitor<'de> for OrderedSources {
        type Value = Vec<SourceConfig>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of source key to source configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sources = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, mut source)) = map.next_entry::<String, SourceConfig>()? {
                source.key = key;
                sources.push(source);
            }
            Ok(sources)
        }
    }

    deserializer.deserialize_map(OrderedSources)
}

/// Validated, immutable set of sources for a run.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    analysis: AnalysisCategories,
    sources: Vec<SourceConfig>,
}

impl SourceRegistry {
    /// Validates a parsed sources file and freezes it into a registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on the first invalid entry.
    pub fn from_file(file: SourcesFile) -> Result<Self, ConfigError> {
        validate_sources(&file)?;
        Ok(Self {
            analysis: file.analysis_categories,
            sources: file.sources,
        })
    }

    #[must_use]
    pub fn analysis_categories(&self) -> &AnalysisCategories {
        &self.analysis
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.key == key)
    }

    /// Sources in processing order: high, then medium, then low priority.
    /// Declaration order is kept within a priority band.
    #[must_use]
    pub fn by_priority(&self) -> Vec<&SourceConfig> {
        let mut ordered: Vec<&SourceConfig> = self.sources.iter().collect();
        ordered.sort_by_key(|s| s.priority);
        ordered
    }
}

/// Load and validate the sources configuration.
///
/// `.yaml`/`.yml` files are parsed as YAML; anything else as JSON.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourceRegistry, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let file: SourcesFile = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::SourcesFileYaml {
            path: path.display().to_string(),
            source: e,
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::SourcesFileParse {
            path: path.display().to_string(),
            source: e,
        })?
    };

    SourceRegistry::from_file(file)
}

fn validate_sources(file: &SourcesFile) -> Result<(), ConfigError> {
    if file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one source must be configured".to_string(),
        ));
    }

    let mut seen_keys = HashSet::new();
    let mut seen_names = HashSet::new();

    for source in &file.sources {
        if !seen_keys.insert(source.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source key: '{}'",
                source.key
            )));
        }

        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' must have a non-empty name",
                source.key
            )));
        }

        if !seen_names.insert(source.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        let url = source.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has invalid url '{}'; must start with http:// or https://",
                source.key, source.url
            )));
        }

        let selectors = &source.selectors;
        for (field, value) in [
            ("articles", &selectors.articles),
            ("title", &selectors.title),
            ("link", &selectors.link),
            ("date", &selectors.date),
            ("content", &selectors.content),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has an empty '{field}' selector",
                    source.key
                )));
            }
        }

        if source.max_articles == Some(0) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has max_articles = 0; omit it for no limit",
                source.key
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
