//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use discodigest_core::pipeline::{
    EntryOutcome, ProgressReporter, RunSummary, SkipReason, run_digest,
};
use discodigest_crawler::HttpFetcher;
use discodigest_shared::{
    AppConfig, DigestConfig, DigestError, Discovery, FallbackPrefix, FeedEntry, init_config,
    load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// discodigest — Markdown digests of a podcast's Discoveries.
#[derive(Parser)]
#[command(
    name = "discodigest",
    version,
    about = "Write one Markdown digest per podcast episode from its Discoveries links.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this file instead of ~/.discodigest/discodigest.toml.
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process the feed once and write any new digests (the default).
    Run(RunArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for a single run.
#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Feed URL to poll.
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Directory the digests are written to.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Pause after each description lookup, in ms.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout for discovery pages, in ms.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Prefix for titles without an episode number: random or hash.
    #[arg(long)]
    pub fallback_prefix: Option<FallbackPrefix>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so they never interleave with the progress lines on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "discodigest=warn",
        1 => "discodigest=info",
        2 => "discodigest=debug",
        _ => "discodigest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config_file {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        None => cmd_run(&config, &RunArgs::default()).await,
        Some(Command::Run(args)) => cmd_run(&config, &args).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Merge CLI overrides into the runtime config.
fn resolve_digest_config(config: &AppConfig, args: &RunArgs) -> DigestConfig {
    let mut digest = DigestConfig::from(config);

    if let Some(url) = &args.feed_url {
        digest.feed_url = url.clone();
    }
    if let Some(out) = &args.out {
        digest.output_dir = out.clone();
    }
    if let Some(ms) = args.delay_ms {
        digest.request_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.timeout_ms {
        digest.fetch_timeout = Duration::from_millis(ms);
    }
    if let Some(fallback) = args.fallback_prefix {
        digest.fallback_prefix = fallback;
    }

    digest
}

async fn cmd_run(config: &AppConfig, args: &RunArgs) -> Result<()> {
    let digest_config = resolve_digest_config(config, args);

    info!(
        feed = %digest_config.feed_url,
        out = %digest_config.output_dir.display(),
        delay_ms = digest_config.request_delay.as_millis(),
        "starting digest run"
    );

    let fetcher = HttpFetcher::new(digest_config.fetch_timeout)?;
    let reporter = CliProgress::new();

    match run_digest(&digest_config, &fetcher, &reporter).await {
        Ok(summary) => {
            println!("  Entries:     {}", summary.entries_seen);
            println!("  Written:     {}", summary.written);
            println!("  Existing:    {}", summary.skipped_existing);
            println!("  Empty:       {}", summary.skipped_empty);
            if summary.failed > 0 {
                println!("  Failed:      {}", summary.failed);
            }
            println!("  Discoveries: {}", summary.discoveries_resolved);
            println!("  Time:        {:.1}s", summary.elapsed.as_secs_f64());
            println!();
            Ok(())
        }
        Err(e) if e.is_feed_failure() => {
            reporter.spinner.finish_and_clear();
            println!("Error occurred in downloading the feed: {e}");
            Ok(())
        }
        Err(e) => {
            reporter.spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Prints per-entry progress lines and shows a spinner while links resolve.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        Self { spinner }
    }

    /// Print a line on stdout without tearing the spinner.
    fn line(&self, text: &str) {
        self.spinner.suspend(|| println!("{text}"));
    }
}

impl ProgressReporter for CliProgress {
    fn feed_downloading(&self, url: &str) {
        self.line(&format!("Downloading RSS feed from {url}..."));
    }

    fn feed_loaded(&self, _entries: usize) {
        self.line("Done.\n");
        self.line("Processing the feed...\n");
    }

    fn entry_started(&self, entry: &FeedEntry) {
        self.line(&format!("Processing: {}...", entry.title));
        self.line(&format!("\turl: {}", entry.url));
    }

    fn discovery_resolving(&self, title: &str, _url: &str, current: usize, total: usize) {
        if current == 1 {
            self.spinner.reset();
            self.spinner.enable_steady_tick(Duration::from_millis(80));
        }
        self.spinner
            .set_message(format!("Resolving [{current}/{total}] {title}"));
    }

    fn discovery_resolved(&self, _discovery: &Discovery, current: usize, total: usize) {
        if current == total {
            self.spinner.disable_steady_tick();
            self.spinner.finish_and_clear();
        }
    }

    fn entry_finished(&self, entry: &FeedEntry, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Written { discoveries, .. } => {
                self.line(&format!(
                    "\tSaved markdown file with {discoveries} discoveries.\n"
                ));
            }
            EntryOutcome::Skipped(SkipReason::AlreadyWritten) => {
                self.line(&format!(
                    "\tMarkdown file for {} exists. Skipping.\n",
                    entry.title
                ));
            }
            EntryOutcome::Skipped(SkipReason::NoDiscoveries) => {
                self.line("\tNo Discoveries found in the entry. Skipping.\n");
            }
        }
    }

    fn entry_failed(&self, _entry: &FeedEntry, error: &DigestError) {
        self.line(&format!("\tFailed to save markdown file: {error}\n"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
