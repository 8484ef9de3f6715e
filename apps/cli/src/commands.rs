//! CLI definition, tracing setup, and the archive run.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use guidebook_core::pipeline::{self, ProgressReporter, RunOutcome};
use guidebook_shared::{RunConfig, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// guidebook — turn a multi-page online guide into offline documents.
#[derive(Parser)]
#[command(
    name = "guidebook",
    version,
    about = "Archive a multi-page online guide into offline Markdown, HTML, and PDF.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Guide entry point (overrides the configured root URL).
    pub url: Option<String>,

    /// Maximum number of guide pages to process.
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Output directory for the combined documents and run metadata.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Directory for per-page section files.
    #[arg(long)]
    pub sections: Option<PathBuf>,

    /// Seconds to wait after every fetch attempt.
    #[arg(long)]
    pub delay: Option<u64>,

    /// In-scope URL path prefix (derived from the root URL when omitted).
    #[arg(long)]
    pub prefix: Option<String>,

    /// Disable the headless-browser fetch fallback.
    #[arg(long)]
    pub no_browser_fallback: bool,

    /// Skip the PDF rendering.
    #[arg(long)]
    pub no_pdf: bool,

    /// Write a default config file to ~/.guidebook/guidebook.toml and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "guidebook=info",
        1 => "guidebook=debug",
        _ => "guidebook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Merge config + flags and run the pipeline to completion.
///
/// Exits zero on success (including runs with partial page failures) and
/// non-zero only on total failure (discovery, config).
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if cli.init_config {
        let path = guidebook_shared::init_config()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = load_config()?;
    let mut run_config = RunConfig::from_config(&config)?;

    if let Some(url) = &cli.url {
        run_config.root_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;
    }
    if let Some(max_pages) = cli.max_pages {
        run_config.max_pages = max_pages;
    }
    if let Some(out) = cli.out {
        run_config.output_dir = out;
    }
    if let Some(sections) = cli.sections {
        run_config.sections_dir = sections;
    }
    if let Some(delay) = cli.delay {
        run_config.delay = Duration::from_secs(delay);
    }
    if cli.prefix.is_some() {
        run_config.path_prefix = cli.prefix;
    }
    if cli.no_browser_fallback {
        run_config.browser_fallback = false;
    }
    if cli.no_pdf {
        run_config.pdf = false;
    }

    info!(
        root = %run_config.root_url,
        max_pages = run_config.max_pages,
        "starting archive run"
    );

    let pdf_requested = run_config.pdf;
    let reporter = CliProgress::new();
    let outcome = pipeline::run(&run_config, &reporter).await?;

    // Print summary
    println!();
    println!("  Guide archived!");
    println!(
        "  Pages:     {}/{} succeeded, {} failed",
        outcome.metadata.pages_succeeded,
        outcome.metadata.pages_discovered,
        outcome.metadata.pages_failed.len()
    );
    println!("  Markdown:  {}", outcome.markdown_path.display());
    println!("  HTML:      {}", outcome.html_path.display());
    match &outcome.pdf_path {
        Some(path) => println!("  PDF:       {}", path.display()),
        None if pdf_requested => {
            println!("  PDF:       skipped (rendering backend unavailable)");
        }
        None => {}
    }
    println!("  Sections:  {}", run_config.sections_dir.display());
    println!("  Time:      {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {url}"));
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
    }
}
