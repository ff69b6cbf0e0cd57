//! Selector-driven record extraction from source listing pages.
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous: the
//! document is parsed, walked, and dropped before the caller's next await.

mod selector;

use std::sync::LazyLock;

use gridintel_core::{RawRecord, SelectorMap, SourceConfig};
use scraper::{ElementRef, Html, Selector};

use crate::client::{is_ignored_href, resolve_link};
use crate::error::ExtractError;

pub use selector::{collapsed_text, SelectorChain};
use selector::{non_empty, parse_selector};

/// Generic containers considered when the article selector matches nothing.
static BROAD_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, article, section").expect("valid selector"));

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3").expect("valid selector"));

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// A source's selector map, compiled once.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    /// Evaluated as a CSS group: the union of matches in document order.
    pub articles: Selector,
    pub title: SelectorChain,
    pub link: SelectorChain,
    pub date: SelectorChain,
    pub content: SelectorChain,
}

impl CompiledSelectors {
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] naming the first selector
    /// that fails to parse.
    pub fn compile(map: &SelectorMap) -> Result<Self, ExtractError> {
        Ok(Self {
            articles: parse_selector(map.articles.trim())?,
            title: SelectorChain::parse(&map.title)?,
            link: SelectorChain::parse(&map.link)?,
            date: SelectorChain::parse(&map.date)?,
            content: SelectorChain::parse(&map.content)?,
        })
    }
}

/// Turns a source page into unclassified [`RawRecord`]s.
#[derive(Debug)]
pub struct RecordExtractor<'s> {
    source: &'s SourceConfig,
    selectors: CompiledSelectors,
}

impl<'s> RecordExtractor<'s> {
    /// Compiles the source's selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] if any configured selector
    /// is not valid CSS.
    pub fn new(source: &'s SourceConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            source,
            selectors: CompiledSelectors::compile(&source.selectors)?,
        })
    }

    /// Parses `html` and extracts records. Relative links resolve against
    /// `page_url`.
    #[must_use]
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        self.extract_document(&document, page_url)
    }

    /// Extracts records from an already parsed document, in document order.
    ///
    /// An element whose link cannot be resolved is logged and dropped; the
    /// remaining elements are still processed. Elements with neither title
    /// nor content produce nothing.
    #[must_use]
    pub fn extract_document(&self, document: &Html, page_url: &str) -> Vec<RawRecord> {
        let candidates = self.candidates(document);
        tracing::debug!(
            source = %self.source.name,
            candidates = candidates.len(),
            "found potential articles"
        );

        let mut records = Vec::with_capacity(candidates.len());
        for (index, element) in candidates.into_iter().enumerate() {
            match self.extract_element(element, page_url) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    tracing::trace!(source = %self.source.name, index, "skipping empty element");
                }
                Err(e) => {
                    tracing::warn!(
                        source = %self.source.name,
                        index,
                        error = %e,
                        "dropping article that failed extraction"
                    );
                }
            }
        }
        records
    }

    fn candidates<'d>(&self, document: &'d Html) -> Vec<ElementRef<'d>> {
        let mut candidates: Vec<ElementRef<'d>> =
            document.select(&self.selectors.articles).collect();

        if candidates.is_empty() {
            tracing::info!(
                source = %self.source.name,
                "no articles matched primary selector; trying broad containers"
            );
            candidates = broad_candidates(document);
        }

        if let Some(max) = self.source.max_articles {
            candidates.truncate(max);
        }
        candidates
    }

    fn extract_element(
        &self,
        element: ElementRef<'_>,
        page_url: &str,
    ) -> Result<Option<RawRecord>, ExtractError> {
        let title = self.selectors.title.first_text(element).unwrap_or_default();
        let link = self.extract_link(element, page_url)?.unwrap_or_default();
        let date = self
            .selectors
            .date
            .first_with(element, |el| {
                non_empty(collapsed_text(el)).or_else(|| {
                    el.value()
                        .attr("datetime")
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_owned)
                })
            })
            .unwrap_or_default();
        let content = self
            .selectors
            .content
            .first_text(element)
            .unwrap_or_else(|| collapsed_text(element));

        Ok(RawRecord::new(
            &self.source.name,
            &self.source.url,
            &self.source.category,
            title,
            link,
            date,
            content,
        ))
    }

    /// The first usable href under `element`, or the element's own href
    /// when it is itself an anchor.
    fn extract_link(
        &self,
        element: ElementRef<'_>,
        page_url: &str,
    ) -> Result<Option<String>, ExtractError> {
        let usable_href = |el: ElementRef<'_>| -> Option<String> {
            el.value()
                .attr("href")
                .map(str::trim)
                .filter(|h| !is_ignored_href(h))
                .map(str::to_owned)
        };

        let href = self
            .selectors
            .link
            .first_with(element, usable_href)
            .or_else(|| {
                if element.value().name() == "a" {
                    usable_href(element)
                } else {
                    None
                }
            });

        match href {
            Some(href) => resolve_link(page_url, &href),
            None => Ok(None),
        }
    }
}

/// Broad-fallback candidates, in document order.
///
/// A story card is the innermost `div`/`article`/`section` holding an
/// `h1`-`h3`. Containers holding only links are used as well, innermost
/// first, unless they sit inside a story card already selected, so a
/// card's nested "read more" wrapper never replaces the card itself.
fn broad_candidates(document: &Html) -> Vec<ElementRef<'_>> {
    let has_heading = |el: &ElementRef<'_>| el.select(&HEADING).next().is_some();
    let has_link = |el: &ElementRef<'_>| el.select(&LINK).next().is_some();
    let is_story_card = |el: &ElementRef<'_>| {
        has_heading(el) && !el.select(&BROAD_CONTAINER).any(|inner| has_heading(&inner))
    };
    let inside_story_card = |el: &ElementRef<'_>| {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|outer| BROAD_CONTAINER.matches(&outer) && is_story_card(&outer))
    };

    document
        .select(&BROAD_CONTAINER)
        .filter(|el| {
            if has_heading(el) {
                is_story_card(el)
            } else {
                has_link(el)
                    && !el.select(&BROAD_CONTAINER).any(|inner| has_link(&inner))
                    && !inside_story_card(el)
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../extract_test.rs"]
mod tests;
