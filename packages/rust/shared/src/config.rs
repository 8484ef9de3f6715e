//! Application configuration for guidebook.
//!
//! User config lives at `~/.guidebook/guidebook.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GuidebookError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "guidebook.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".guidebook";

// ---------------------------------------------------------------------------
// Config structs (matching guidebook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Fetch behavior.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Selector lists, the sole adaptation point when the upstream site's
    /// page structure changes.
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Guide entry point.
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Maximum number of guide pages to process.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Fixed delay in seconds inserted after every fetch attempt.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// Directory for combined outputs and metadata.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory for per-page section files.
    #[serde(default = "default_sections_dir")]
    pub sections_dir: String,

    /// URL path prefix that in-scope guide pages must share.
    /// Derived from the root URL when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            max_pages: default_max_pages(),
            delay_secs: default_delay_secs(),
            output_dir: default_output_dir(),
            sections_dir: default_sections_dir(),
            path_prefix: None,
        }
    }
}

fn default_root_url() -> String {
    "https://support.apple.com/en-in/guide/shortcuts/welcome/ios".into()
}
fn default_max_pages() -> usize {
    200
}
fn default_delay_secs() -> u64 {
    1
}
fn default_output_dir() -> String {
    "output".into()
}
fn default_sections_dir() -> String {
    "sections".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum plain-HTTP attempts per page before the fallback kicks in.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to fall back to a headless-browser fetch when plain HTTP
    /// attempts are exhausted.
    #[serde(default = "default_true")]
    pub browser_fallback: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            browser_fallback: default_true(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

/// `[selectors]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// TOC-region candidates, tried in order; first match wins.
    #[serde(default = "default_nav_selectors")]
    pub nav: Vec<String>,

    /// Content-root candidates, tried in order; first match wins.
    #[serde(default = "default_content_selectors")]
    pub content: Vec<String>,

    /// Elements pruned from extracted content.
    #[serde(default = "default_unwanted_selectors")]
    pub unwanted: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            nav: default_nav_selectors(),
            content: default_content_selectors(),
            unwanted: default_unwanted_selectors(),
        }
    }
}

fn default_nav_selectors() -> Vec<String> {
    [
        "nav.localnav",
        "nav[role=\"navigation\"]",
        "aside.sidebar",
        "div.topics",
        "div.table-of-contents",
        "ul.toc",
        "nav#sections",
        "div#sections",
        "aside#sections",
        "main ul",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_content_selectors() -> Vec<String> {
    [
        "main",
        "article",
        "div[role=\"main\"]",
        "div.content",
        "div#main-content",
        "div.article-content",
        "div#content",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_unwanted_selectors() -> Vec<String> {
    [
        "nav",
        "header",
        "footer",
        "aside",
        "script",
        "style",
        "iframe",
        "noscript",
        "button",
        ".advertisement",
        ".ads",
        ".cookie-banner",
        ".cookie-consent",
        ".social-share",
        ".breadcrumb",
        ".feedback",
        ".related-links",
        ".page-nav",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for a single run — merged from config file + CLI
/// flags, with the root URL parsed and validated up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Guide entry point.
    pub root_url: Url,
    /// Maximum number of guide pages to process.
    pub max_pages: usize,
    /// Fixed delay inserted after every fetch attempt.
    pub delay: Duration,
    /// Directory for combined outputs and metadata.
    pub output_dir: PathBuf,
    /// Directory for per-page section files.
    pub sections_dir: PathBuf,
    /// In-scope URL path prefix; derived from the root when `None`.
    pub path_prefix: Option<String>,
    /// Maximum plain-HTTP attempts per page.
    pub max_retries: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Whether the headless-browser fetch fallback is enabled.
    pub browser_fallback: bool,
    /// Whether to attempt the print (PDF) rendering.
    pub pdf: bool,
    /// Selector lists.
    pub selectors: SelectorConfig,
}

impl RunConfig {
    /// Build a run config from an [`AppConfig`], parsing the root URL.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let root_url = Url::parse(&config.defaults.root_url).map_err(|e| {
            GuidebookError::config(format!(
                "invalid root_url '{}': {e}",
                config.defaults.root_url
            ))
        })?;

        Ok(Self {
            root_url,
            max_pages: config.defaults.max_pages,
            delay: Duration::from_secs(config.defaults.delay_secs),
            output_dir: PathBuf::from(&config.defaults.output_dir),
            sections_dir: PathBuf::from(&config.defaults.sections_dir),
            path_prefix: config.defaults.path_prefix.clone(),
            max_retries: config.fetch.max_retries,
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            browser_fallback: config.fetch.browser_fallback,
            pdf: true,
            selectors: config.selectors.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.guidebook/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GuidebookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.guidebook/guidebook.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GuidebookError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GuidebookError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GuidebookError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GuidebookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GuidebookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
