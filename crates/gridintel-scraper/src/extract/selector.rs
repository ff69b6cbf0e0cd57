//! Selector-fallback chains.
//!
//! A configured field selector such as `".summary, .excerpt, p"` is not
//! evaluated as a CSS group (which would return the union in document order)
//! but as an ordered list of alternatives: `.summary` first, then `.excerpt`,
//! then `p`. The first alternative producing a non-empty value wins.

use scraper::{ElementRef, Selector};

use crate::error::ExtractError;

/// Parses a single CSS selector, mapping parse failures to [`ExtractError`].
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Splits a selector group on commas that are not nested inside
/// parentheses, brackets, or quotes. Empty pieces are discarded.
pub(crate) fn split_top_level(group: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;

    for (i, c) in group.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&group[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&group[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// An ordered list of alternative selectors for one field.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    alternatives: Vec<Selector>,
}

impl SelectorChain {
    /// Compiles every alternative of `group`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] for the first alternative
    /// that fails to parse, or if `group` contains no alternatives at all.
    pub fn parse(group: &str) -> Result<Self, ExtractError> {
        let alternatives = split_top_level(group)
            .into_iter()
            .map(parse_selector)
            .collect::<Result<Vec<_>, _>>()?;
        if alternatives.is_empty() {
            return Err(ExtractError::InvalidSelector {
                selector: group.to_owned(),
                reason: "no selectors in group".to_owned(),
            });
        }
        Ok(Self { alternatives })
    }

    /// Tries each alternative in order, and within an alternative each
    /// descendant of `scope` in document order, returning the first value
    /// `pick` produces.
    pub fn first_with<'a, T, F>(&self, scope: ElementRef<'a>, mut pick: F) -> Option<T>
    where
        F: FnMut(ElementRef<'a>) -> Option<T>,
    {
        self.alternatives
            .iter()
            .find_map(|selector| scope.select(selector).find_map(&mut pick))
    }

    /// First non-empty, whitespace-collapsed text under `scope`.
    #[must_use]
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.first_with(scope, |el| non_empty(collapsed_text(el)))
    }
}

/// Text content of `element` with every run of whitespace collapsed to a
/// single space and the ends trimmed.
#[must_use]
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
