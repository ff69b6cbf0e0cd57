//! Link resolution and domain extraction.

use crate::error::ExtractError;

const IGNORED_SCHEMES: [&str; 5] = ["javascript:", "mailto:", "tel:", "data:", "blob:"];

/// Resolves an `href` found on a page against the page URL.
///
/// Returns `Ok(None)` for hrefs that do not point at a web document: empty,
/// fragment-only, script/mail/phone/data URIs, or any resolved scheme other
/// than http(s). Absolute hrefs are returned normalized; relative ones are
/// joined onto `base`.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidLink`] if `base` is not an absolute URL or
/// the join fails.
pub fn resolve_link(base: &str, href: &str) -> Result<Option<String>, ExtractError> {
    let href = href.trim();
    if is_ignored_href(href) {
        return Ok(None);
    }

    let invalid = |reason: String| ExtractError::InvalidLink {
        href: href.to_owned(),
        base: base.to_owned(),
        reason,
    };
    let base_url = reqwest::Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    let joined = base_url.join(href).map_err(|e| invalid(e.to_string()))?;
    if !matches!(joined.scheme(), "http" | "https") {
        return Ok(None);
    }
    Ok(Some(joined.to_string()))
}

/// `true` for hrefs that never lead to a web document: empty, fragment-only,
/// or script/mail/phone/data URIs.
#[must_use]
pub fn is_ignored_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return true;
    }
    let lowered = href.to_ascii_lowercase();
    IGNORED_SCHEMES.iter().any(|s| lowered.starts_with(s))
}

/// Extracts the hostname from a URL for use in logs and error messages.
///
/// Falls back to the full URL string if parsing fails.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
