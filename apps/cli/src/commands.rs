//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use herodex_core::{
    PageFetcher, PassSummary, ProgressReporter, SilentProgress, parse_daily_at, run_ability_pass,
    run_all, run_daily, run_lore_pass, run_news_pass, run_roster_pass,
};
use herodex_shared::{AppConfig, ScrapeConfig, init_config, load_config, load_config_from};
use herodex_storage::Storage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// herodex: character wiki and news ingestion.
#[derive(Parser)]
#[command(
    name = "herodex",
    version,
    about = "Scrape character wiki pages and game news into a local database.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.herodex/herodex.toml).
    #[arg(long, global = true, env = "HERODEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding `[storage] db_path`.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Pause after each ability fetch in milliseconds, overriding `[scrape] ability_delay_ms`.
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape every configured news URL.
    News,
    /// Scrape the roster page into character identities.
    Roster,
    /// Scrape stats and biography for every stored character.
    Lore,
    /// Scrape abilities for every stored character.
    Abilities,
    /// Run news, roster, lore and abilities in sequence.
    RunAll,
    /// Run everything once a day until interrupted.
    Schedule {
        /// Daily start time, HH:MM in UTC, overriding `[schedule] daily_at`.
        #[arg(long)]
        at: Option<String>,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
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
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "herodex=info",
        1 => "herodex=debug",
        _ => "herodex=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
    if let Command::Config {
        action: ConfigAction::Init,
    } = cli.command
    {
        return cmd_config_init();
    }

    let app = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match &cli.command {
        Command::Config { .. } => cmd_config_show(&app),
        Command::Schedule { at } => cmd_schedule(&cli, &app, at.as_deref()).await,
        Command::News | Command::Roster | Command::Lore | Command::Abilities | Command::RunAll => {
            cmd_pass(&cli, &app).await
        }
    }
}

/// Everything a pass needs, resolved from config and flags.
struct Session {
    config: ScrapeConfig,
    storage: Storage,
}

impl Session {
    async fn open(cli: &Cli, app: &AppConfig) -> Result<Self> {
        let mut config = ScrapeConfig::try_from(app)?;
        if let Some(ms) = cli.delay_ms {
            config.ability_delay = Duration::from_millis(ms);
        }

        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => app.db_path()?,
        };
        info!(db = %db_path.display(), "opening database");
        let storage = Storage::open(&db_path).await?;

        Ok(Self { config, storage })
    }
}

async fn cmd_pass(cli: &Cli, app: &AppConfig) -> Result<()> {
    let session = Session::open(cli, app).await?;
    let fetcher = PageFetcher::new(&session.config)?;
    let progress = CliProgress::new();
    let (config, storage) = (&session.config, &session.storage);

    let summaries = match cli.command {
        Command::News => vec![run_news_pass(config, &fetcher, storage, &progress).await?],
        Command::Roster => vec![run_roster_pass(config, &fetcher, storage, &progress).await?],
        Command::Lore => vec![run_lore_pass(config, &fetcher, storage, &progress).await?],
        Command::Abilities => vec![run_ability_pass(config, &fetcher, storage, &progress).await?],
        Command::RunAll => run_all(config, &fetcher, storage, &progress).await?,
        _ => return Err(eyre!("not an ingestion command")),
    };

    progress.finish();
    print_summaries(&summaries);
    Ok(())
}

async fn cmd_schedule(cli: &Cli, app: &AppConfig, at: Option<&str>) -> Result<()> {
    let at = parse_daily_at(at.unwrap_or(&app.schedule.daily_at))?;
    let session = Session::open(cli, app).await?;

    println!("Scheduled daily at {} UTC. Press Ctrl-C to stop.", at.format("%H:%M"));
    // Unattended runs report through the log only.
    run_daily(&session.config, &session.storage, at, &SilentProgress).await?;
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(app: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(app)?;
    println!("{toml_str}");
    Ok(())
}

fn print_summaries(summaries: &[PassSummary]) {
    println!();
    for summary in summaries {
        println!(
            "  {:<10} processed {:>4}  skipped {:>3}  errors {:>3}  ({:.1}s)",
            summary.pass.as_str(),
            summary.processed,
            summary.skipped,
            summary.errors.len(),
            summary.duration.as_secs_f64()
        );
        for (item, message) in &summary.errors {
            println!("      ! {item}: {message}");
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Progress reporters
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
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(format!("{name} pass"));
    }

    fn item(&self, label: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {label}"));
    }

    fn done(&self, summary: &PassSummary) {
        self.spinner.println(format!(
            "  done: {} ({} processed, {} errors)",
            summary.pass,
            summary.processed,
            summary.errors.len()
        ));
    }
}
