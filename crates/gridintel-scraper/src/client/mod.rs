//! HTTP fetcher for source listing pages.

mod origin;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::{retry_with_backoff, FetchPolicy};

pub use origin::{extract_domain, is_ignored_href, resolve_link};

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL as requested.
    pub url: String,
    /// URL after redirects. Relative links on the page resolve against this.
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

/// Fetches source pages with a browser-like identity, per-attempt pacing,
/// and exponential backoff on failure.
///
/// Only 2xx responses count as success. Every other status, as well as
/// timeouts and connection errors, consumes one attempt.
pub struct HttpFetcher {
    client: Client,
    policy: FetchPolicy,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with the given retry policy, request timeout,
    /// and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        policy: FetchPolicy,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, policy })
    }

    #[must_use]
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches `url`, retrying per the configured policy.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute http(s) URL (no request made).
    /// - [`ScraperError::RateLimited`]: HTTP 429 on the final attempt.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status on the final attempt.
    /// - [`ScraperError::Http`]: timeout, connection, or body read failure on the final attempt.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let parsed = match parse_page_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(url, error = %e, "refusing to fetch invalid url");
                return Err(e);
            }
        };

        let result = retry_with_backoff(self.policy, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain: extract_domain(parsed.as_str()),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: parsed.to_string(),
                    });
                }

                let final_url = response.url().to_string();
                let body = response.text().await?;
                Ok(FetchedPage {
                    url: parsed.to_string(),
                    final_url,
                    status: status.as_u16(),
                    body,
                })
            }
        })
        .await;

        if let Err(e) = &result {
            tracing::error!(
                url,
                max_attempts = self.policy.max_attempts,
                error = %e,
                "giving up on page after all attempts"
            );
        }
        result
    }
}

/// Parses `url`, accepting only absolute http(s) URLs.
fn parse_page_url(url: &str) -> Result<reqwest::Url, ScraperError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
