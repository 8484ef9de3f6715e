//! Headless-browser session for guidebook.
//!
//! Isolates the heavy `headless_chrome` dependency in its own crate. One
//! Chrome process serves two jobs: the JavaScript-rendering fetch fallback
//! for pages that block plain HTTP, and the HTML-to-PDF print pipeline.
//!
//! The process is launched lazily on first use and killed when the session
//! handle is dropped, so the run releases it on every exit path.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info};
use url::Url;

use guidebook_shared::{GuidebookError, Result};

/// Extra settle time after navigation, for client-side hydration.
const RENDER_SETTLE: Duration = Duration::from_millis(800);

/// A4 paper size in inches.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.7;

// ---------------------------------------------------------------------------
// BrowserSession
// ---------------------------------------------------------------------------

/// A run-scoped handle to a lazily launched headless Chrome instance.
///
/// Cheap to clone; all clones share the same process. Dropping the last
/// clone tears the process down.
#[derive(Clone, Default)]
pub struct BrowserSession {
    inner: Arc<Mutex<Option<Browser>>>,
}

impl BrowserSession {
    /// Create a session handle. Does not launch Chrome yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a page with a real browser, rendering JavaScript and waiting
    /// for the DOM to be ready, then return the resulting page source.
    pub fn fetch_rendered(&self, url: &str) -> Result<String> {
        self.with_browser(|browser| {
            debug!(%url, "browser fetch");

            let tab = browser
                .new_tab()
                .map_err(|e| GuidebookError::fetch(url, format!("browser tab: {e}")))?;

            tab.navigate_to(url)
                .map_err(|e| GuidebookError::fetch(url, format!("browser navigate: {e}")))?;

            tab.wait_until_navigated()
                .map_err(|e| GuidebookError::fetch(url, format!("browser wait: {e}")))?;

            // Wait for client-side rendering to settle.
            let _ = tab.wait_for_element("body");
            std::thread::sleep(RENDER_SETTLE);

            tab.get_content()
                .map_err(|e| GuidebookError::fetch(url, format!("browser content: {e}")))
        })
    }

    /// Print a local HTML file to PDF via Chrome's print pipeline.
    pub fn print_pdf(&self, html_path: &Path, pdf_path: &Path) -> Result<()> {
        let absolute = html_path
            .canonicalize()
            .map_err(|e| GuidebookError::io(html_path, e))?;
        let file_url = Url::from_file_path(&absolute)
            .map_err(|()| GuidebookError::Render(format!("not a file path: {absolute:?}")))?;

        let pdf_bytes = self.with_browser(|browser| {
            debug!(input = %file_url, "printing to PDF");

            let tab = browser
                .new_tab()
                .map_err(|e| GuidebookError::Render(format!("browser tab: {e}")))?;

            tab.navigate_to(file_url.as_str())
                .map_err(|e| GuidebookError::Render(format!("navigate: {e}")))?;

            tab.wait_until_navigated()
                .map_err(|e| GuidebookError::Render(format!("wait: {e}")))?;

            let options = PrintToPdfOptions {
                print_background: Some(true),
                prefer_css_page_size: Some(true),
                paper_width: Some(A4_WIDTH_IN),
                paper_height: Some(A4_HEIGHT_IN),
                ..Default::default()
            };

            tab.print_to_pdf(Some(options))
                .map_err(|e| GuidebookError::Render(format!("print_to_pdf: {e}")))
        })?;

        std::fs::write(pdf_path, pdf_bytes).map_err(|e| GuidebookError::io(pdf_path, e))?;

        info!(path = %pdf_path.display(), "PDF written");
        Ok(())
    }

    /// Run `f` against the shared browser, launching Chrome on first use.
    fn with_browser<T>(&self, f: impl FnOnce(&Browser) -> Result<T>) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.is_none() {
            info!("launching headless browser");
            let browser = Browser::new(LaunchOptions {
                headless: true,
                ..Default::default()
            })
            .map_err(|e| GuidebookError::Render(format!("failed to launch browser: {e}")))?;
            *guard = Some(browser);
        }

        // Present after the launch above.
        let browser = guard.as_ref().ok_or_else(|| {
            GuidebookError::Render("browser session unavailable".into())
        })?;

        f(browser)
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let launched = self
            .inner
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        f.debug_struct("BrowserSession")
            .field("launched", &launched)
            .finish()
    }
}
