//! Guide page discovery via the root page's table of contents.
//!
//! The root page embeds a navigational link list covering every page of the
//! guide. Discovery locates that region with an ordered candidate selector
//! list (first match wins), extracts the in-scope links, and returns them
//! de-duplicated in document order, which is the guide's reading order.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use guidebook_fetcher::FetchContext;
use guidebook_shared::{GuidebookError, Result, SelectorConfig};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the discovery step.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Hard cap on the number of pages; excess links are truncated.
    pub max_pages: usize,
    /// Explicit in-scope path prefix. Derived from the root URL when unset.
    pub path_prefix: Option<String>,
    /// TOC-region candidate selectors, tried in order.
    pub nav_selectors: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_pages: 200,
            path_prefix: None,
            nav_selectors: SelectorConfig::default().nav,
        }
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Determines which URLs belong to the guide being archived.
#[derive(Debug, Clone)]
pub struct GuideScope {
    host: String,
    path_prefix: String,
}

impl GuideScope {
    /// Derive the scope from the root URL, or take an explicit prefix.
    ///
    /// Without an override, roots with three or more path segments keep all
    /// but the last two (`/en-in/guide/shortcuts/welcome/ios` →
    /// `/en-in/guide/shortcuts`), two-segment roots keep the first
    /// (`/docs/intro` → `/docs`), and anything shorter scopes to the whole
    /// host.
    pub fn derive(root: &Url, override_prefix: Option<&str>) -> Self {
        let host = root.host_str().unwrap_or("").to_string();

        if let Some(prefix) = override_prefix {
            let mut prefix = prefix.to_string();
            if !prefix.starts_with('/') {
                prefix.insert(0, '/');
            }
            return Self {
                host,
                path_prefix: prefix,
            };
        }

        let segments: Vec<&str> = root
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let keep = match segments.len() {
            0 | 1 => 0,
            2 => 1,
            n => n - 2,
        };

        let path_prefix = if keep == 0 {
            "/".to_string()
        } else {
            format!("/{}", segments[..keep].join("/"))
        };

        Self { host, path_prefix }
    }

    /// Whether `url` is part of the guide.
    pub fn contains(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }
        if url.host_str().unwrap_or("") != self.host {
            return false;
        }
        url.path().starts_with(&self.path_prefix)
    }

    /// The effective path prefix (useful for logging).
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Fetch the root page and extract the ordered guide page list.
///
/// Any failure to obtain or interpret the root page is fatal: without a
/// table of contents there is nothing to archive.
#[instrument(skip_all, fields(root = %root_url))]
pub async fn discover(
    ctx: &FetchContext,
    root_url: &Url,
    opts: &DiscoveryOptions,
) -> Result<Vec<Url>> {
    let body = ctx
        .fetch_page(root_url.as_str())
        .await
        .map_err(|e| GuidebookError::discovery(format!("root page unreachable: {e}")))?;

    let pages = extract_toc_links(&body, root_url, opts)?;

    info!(pages = pages.len(), "guide pages discovered");
    Ok(pages)
}

/// Extract in-scope TOC links from an already fetched root page body.
///
/// Pure function over the HTML; the async fetch lives in [`discover`].
pub fn extract_toc_links(
    html: &str,
    root_url: &Url,
    opts: &DiscoveryOptions,
) -> Result<Vec<Url>> {
    let doc = Html::parse_document(html);
    let scope = GuideScope::derive(root_url, opts.path_prefix.as_deref());

    let region = find_toc_region(&doc, &opts.nav_selectors).ok_or_else(|| {
        GuidebookError::discovery("no table-of-contents region matched any nav selector")
    })?;

    let link_sel = Selector::parse("a[href]").expect("static selector");
    let mut seen = HashSet::new();
    let mut pages = Vec::new();

    for el in region.select(&link_sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };

        // Skip in-page anchors and non-navigational schemes.
        if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:")
        {
            continue;
        }

        let Ok(mut resolved) = root_url.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if !scope.contains(&resolved) {
            debug!(url = %resolved, "out of scope, skipping");
            continue;
        }

        if seen.insert(resolved.to_string()) {
            pages.push(resolved);
        }
    }

    if pages.is_empty() {
        return Err(GuidebookError::discovery(format!(
            "zero in-scope links found (host {}, prefix {})",
            scope.host,
            scope.path_prefix()
        )));
    }

    if pages.len() > opts.max_pages {
        warn!(
            found = pages.len(),
            max = opts.max_pages,
            "TOC exceeds page cap, truncating"
        );
        pages.truncate(opts.max_pages);
    }

    Ok(pages)
}

/// Find the TOC region: first nav selector that matches wins.
fn find_toc_region<'a>(
    doc: &'a Html,
    selectors: &[String],
) -> Option<scraper::ElementRef<'a>> {
    for sel_str in selectors {
        let Ok(selector) = Selector::parse(sel_str) else {
            warn!(selector = %sel_str, "invalid nav selector, skipping");
            continue;
        };
        if let Some(el) = doc.select(&selector).next() {
            debug!(selector = %sel_str, "TOC region matched");
            return Some(el);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
