//! Page fetching with bounded retry and an explicit browser fallback.
//!
//! All fetch state (HTTP client, headers, delay, retry bound) lives in an
//! explicitly passed [`FetchContext`]; there is no ambient session. A fetch
//! runs in two stages: plain HTTP attempts that each yield
//! [`FetchAttempt::Success`] or [`FetchAttempt::Retryable`], then, once the
//! retry bound is exhausted, an explicitly selected browser-automation
//! strategy for pages that block plain HTTP.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

use guidebook_browser::BrowserSession;
use guidebook_shared::{GuidebookError, Result, RunConfig};

/// Browser-like User-Agent; some documentation hosts reject generic clients.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANG: &str = "en-US,en;q=0.9";

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// FetchAttempt
// ---------------------------------------------------------------------------

/// Outcome of a single plain-HTTP attempt.
#[derive(Debug)]
pub enum FetchAttempt {
    /// HTTP 2xx with a readable body.
    Success(String),
    /// Non-2xx status, timeout, or connection error; worth another attempt.
    Retryable { reason: String },
}

// ---------------------------------------------------------------------------
// FetchContext
// ---------------------------------------------------------------------------

/// Everything a fetch call needs: session, headers, pacing, retry bound,
/// and the optional browser fallback. Built once per run and passed into
/// every call.
#[derive(Debug, Clone)]
pub struct FetchContext {
    client: Client,
    delay: Duration,
    max_retries: u32,
    browser: Option<BrowserSession>,
}

impl FetchContext {
    /// Build a context with browser-like headers and the given pacing.
    ///
    /// `browser` is `None` when the fallback strategy is disabled.
    pub fn new(
        timeout: Duration,
        delay: Duration,
        max_retries: u32,
        browser: Option<BrowserSession>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANG));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| GuidebookError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            delay,
            max_retries: max_retries.max(1),
            browser,
        })
    }

    /// Build a context from a run config, attaching the browser fallback
    /// when the config enables it.
    pub fn from_run_config(config: &RunConfig, browser: Option<BrowserSession>) -> Result<Self> {
        Self::new(
            config.timeout,
            config.delay,
            config.max_retries,
            browser.filter(|_| config.browser_fallback),
        )
    }

    /// Perform one plain GET against `url`.
    async fn attempt(&self, url: &str) -> FetchAttempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchAttempt::Retryable {
                    reason: format!("transport error: {e}"),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchAttempt::Retryable {
                reason: format!("HTTP {status}"),
            };
        }

        match response.text().await {
            Ok(body) => FetchAttempt::Success(body),
            Err(e) => FetchAttempt::Retryable {
                reason: format!("body read failed: {e}"),
            },
        }
    }

    /// Stage one: plain HTTP with a fixed retry bound.
    ///
    /// The fixed delay is inserted after **every** attempt regardless of
    /// outcome, bounding the request rate. Returns the body on success, or
    /// the last failure reason once the bound is exhausted.
    pub async fn fetch_with_retry(&self, url: &str) -> std::result::Result<String, String> {
        let mut last_reason = String::from("no attempts made");

        for attempt in 1..=self.max_retries {
            let outcome = self.attempt(url).await;
            self.pause().await;

            match outcome {
                FetchAttempt::Success(body) => {
                    debug!(%url, attempt, bytes = body.len(), "fetched");
                    return Ok(body);
                }
                FetchAttempt::Retryable { reason } => {
                    debug!(%url, attempt, %reason, "attempt failed");
                    last_reason = reason;
                }
            }
        }

        Err(last_reason)
    }

    /// Fetch a page, selecting strategies in order: plain HTTP with retry,
    /// then the browser fallback (when enabled).
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let reason = match self.fetch_with_retry(url).await {
            Ok(body) => return Ok(body),
            Err(reason) => reason,
        };

        let Some(session) = &self.browser else {
            return Err(GuidebookError::fetch(url, reason));
        };

        warn!(%url, %reason, "plain fetch exhausted, switching to browser strategy");

        let session = session.clone();
        let target = url.to_string();
        let result = tokio::task::spawn_blocking(move || session.fetch_rendered(&target))
            .await
            .map_err(|e| GuidebookError::fetch(url, format!("browser task failed: {e}")))?;

        self.pause().await;
        result
    }

    /// The fixed inter-request delay.
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
