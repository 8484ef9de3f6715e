//! End-to-end archive run: discover → fetch → extract → store → compile →
//! render.
//!
//! Strictly sequential: pages are fetched and extracted one at a time in
//! discovery order. A failed page is recorded and skipped; only a discovery
//! failure aborts the run. No output files are created before discovery
//! succeeds.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument, warn};
use url::Url;

use guidebook_browser::BrowserSession;
use guidebook_discovery::DiscoveryOptions;
use guidebook_extract::ExtractOptions;
use guidebook_fetcher::FetchContext;
use guidebook_shared::{FailedPage, GuidePage, GuidebookError, Result, RunConfig, RunMetadata};

use crate::{compiler, render, store};

// ---------------------------------------------------------------------------
// Outcome & progress
// ---------------------------------------------------------------------------

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Path of the combined Markdown document.
    pub markdown_path: PathBuf,
    /// Path of the standalone HTML document.
    pub html_path: PathBuf,
    /// Path of the print rendering, when it was produced.
    pub pdf_path: Option<PathBuf>,
    /// Per-page section files, in page order.
    pub section_paths: Vec<PathBuf>,
    /// Run statistics, also written to `metadata.json`.
    pub metadata: RunMetadata,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each page fetch.
    fn page_fetched(&self, url: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the full pipeline.
#[instrument(skip_all, fields(root = %config.root_url))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunOutcome> {
    let start = Instant::now();

    // One browser session for the whole run, shared by the fetch fallback
    // and the PDF printer. Chrome, if it ever launches, dies with this
    // handle on every exit path.
    let browser = BrowserSession::new();
    let ctx = FetchContext::from_run_config(config, Some(browser.clone()))?;

    // --- Phase 1: Discovery ---
    progress.phase("Discovering guide pages");
    let discovery_opts = DiscoveryOptions {
        max_pages: config.max_pages,
        path_prefix: config.path_prefix.clone(),
        nav_selectors: config.selectors.nav.clone(),
    };
    let urls = guidebook_discovery::discover(&ctx, &config.root_url, &discovery_opts).await?;

    // --- Phase 2: Fetch + extract + store, one page at a time ---
    let extract_opts = ExtractOptions::from(&config.selectors);
    let total = urls.len();
    let mut pages: Vec<GuidePage> = Vec::new();
    let mut failed: Vec<FailedPage> = Vec::new();
    let mut section_paths: Vec<PathBuf> = Vec::new();

    for (index, url) in urls.iter().enumerate() {
        progress.page_fetched(url.as_str(), index + 1, total);

        let body = match ctx.fetch_page(url.as_str()).await {
            Ok(body) => body,
            Err(err) => {
                warn!(%url, error = %err, "page failed, skipping");
                failed.push(FailedPage {
                    url: url.to_string(),
                    reason: failure_reason(&err),
                });
                continue;
            }
        };

        let page = match guidebook_extract::extract(&body, url, &extract_opts) {
            Ok(extracted) => GuidePage {
                index,
                url: url.to_string(),
                title: extracted.title,
                blocks: extracted.blocks,
            },
            Err(err) => {
                warn!(%url, error = %err, "extraction failed, keeping empty page");
                GuidePage {
                    index,
                    url: url.to_string(),
                    title: title_from_url(url),
                    blocks: Vec::new(),
                }
            }
        };

        section_paths.push(store::write_section(&config.sections_dir, &page)?);
        pages.push(page);
    }

    // --- Phase 3: Compile ---
    progress.phase("Compiling combined document");
    let succeeded = pages.len();
    let doc = compiler::compile(pages, &config.root_url);

    let markdown_path = config.output_dir.join("guide.md");
    store::write_text(&markdown_path, &compiler::to_markdown(&doc))?;

    // --- Phase 4: Render ---
    progress.phase("Rendering HTML");
    let html_path = config.output_dir.join("guide.html");
    store::write_text(&html_path, &render::to_html(&doc))?;

    let pdf_path = if config.pdf {
        progress.phase("Printing PDF");
        let target = config.output_dir.join("guide.pdf");
        match print_pdf(&browser, &html_path, &target).await {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %err, "PDF rendering skipped");
                None
            }
        }
    } else {
        None
    };

    // --- Phase 5: Metadata ---
    let metadata = RunMetadata {
        root_url: config.root_url.to_string(),
        pages_discovered: total,
        pages_succeeded: succeeded,
        pages_failed: failed,
        timestamp: Utc::now(),
    };
    store::write_metadata(&config.output_dir, &metadata)?;

    let outcome = RunOutcome {
        markdown_path,
        html_path,
        pdf_path,
        section_paths,
        metadata,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        pages_discovered = outcome.metadata.pages_discovered,
        pages_succeeded = outcome.metadata.pages_succeeded,
        pages_failed = outcome.metadata.pages_failed.len(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "run complete"
    );

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Move the blocking Chrome print off the async runtime.
async fn print_pdf(
    browser: &BrowserSession,
    html_path: &Path,
    pdf_path: &Path,
) -> Result<PathBuf> {
    let session = browser.clone();
    let html = html_path.to_path_buf();
    let pdf = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || session.print_pdf(&html, &pdf))
        .await
        .map_err(|e| GuidebookError::Render(format!("print task failed: {e}")))??;

    Ok(pdf_path.to_path_buf())
}

/// The per-page failure reason recorded in metadata.
fn failure_reason(err: &GuidebookError) -> String {
    match err {
        GuidebookError::Fetch { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

/// A readable title for a page that yielded no content.
fn title_from_url(url: &Url) -> String {
    let segment = url
        .path()
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default();

    if segment.is_empty() {
        return "Untitled".to_string();
    }

    segment
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.collect::<String>())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
