//! # gh-standup CLI (`standup`)
//!
//! The `standup` binary gathers local git state and GitHub activity into a
//! single JSON snapshot that report generators consume.
//!
//! ## Usage
//!
//! ```bash
//! standup --config ~/.config/gh-standup/config.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `standup collect` | Run the aggregation pipeline and print the snapshot |
//! | `standup dirs` | List configured directories and whether they will be collected |
//!
//! ## Examples
//!
//! ```bash
//! # Today's snapshot for the configured user
//! standup collect
//!
//! # Monday morning: cover Friday through Sunday
//! standup collect --yesterday
//!
//! # A week of someone else's activity, saved to a file
//! standup collect --user octocat --last-week --output week.json
//! ```

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gh_standup::aggregate::Aggregator;
use gh_standup::config::{self, Config, GitHubBackend};
use gh_standup::connector_github::GhCli;
use gh_standup::window::{effective_days, ReportWindow};
use gh_standup::{export, logging, sources};

/// gh-standup CLI — collect local git state and GitHub activity into one
/// snapshot for standup reports.
#[derive(Parser)]
#[command(
    name = "standup",
    about = "gh-standup — collect local git state and GitHub activity for standup reports",
    version,
    long_about = "gh-standup scans the configured working copies for uncommitted and unpushed \
    work in parallel, fetches the user's GitHub commits, pull requests and issues in a single \
    query, and prints the combined snapshot as JSON."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `~/.config/gh-standup/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overrides `[log].level`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Collect the activity snapshot.
    ///
    /// Scans every enabled directory that exists, fetches GitHub activity
    /// once, and prints the aggregated result as JSON. Exits non-zero
    /// without output when no directory can be collected.
    Collect {
        /// GitHub username (default: `user` from config, then the `gh` login).
        #[arg(short, long)]
        user: Option<String>,

        /// Number of days to look back.
        #[arg(short, long, conflicts_with_all = ["yesterday", "last_week"])]
        days: Option<u32>,

        /// Yesterday's work (Friday through Sunday when run on a Monday).
        #[arg(long, conflicts_with = "last_week")]
        yesterday: bool,

        /// The last 7 days.
        #[arg(long)]
        last_week: bool,

        /// Write the snapshot to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List configured directories.
    ///
    /// Shows each directory's id, enabled flag, whether its path exists,
    /// branch and repository.
    Dirs,
}

async fn resolve_user(cli_user: Option<String>, cfg: &Config) -> anyhow::Result<String> {
    if let Some(user) = cli_user.or_else(|| cfg.user.clone()) {
        return Ok(user);
    }
    if cfg.github.backend == GitHubBackend::Api {
        anyhow::bail!("no user configured; pass --user or set `user` in the config");
    }
    tracing::info!("Detecting current GitHub user...");
    let gh = GhCli::new(&cfg.github.gh_binary, cfg.github.limit, cfg.log.verbose_commands);
    gh.current_user()
        .await
        .context("Failed to detect GitHub user; pass --user or set `user` in the config")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)?;
    logging::init(&cfg.log, cli.verbose);

    match cli.command {
        Commands::Dirs => {
            sources::list_directories(&cfg)?;
        }
        Commands::Collect {
            user,
            days,
            yesterday,
            last_week,
            output,
        } => {
            let dirs = cfg.select_directories()?;

            let today = Local::now().date_naive();
            let days = effective_days(today, yesterday, last_week, days, cfg.days);
            let window = ReportWindow::ending(today, days)?;
            let user = resolve_user(user, &cfg).await?;

            let aggregator = Aggregator::from_config(&cfg)?;
            let activity = aggregator.run(&dirs, &user, &window).await?;
            export::write_json(&activity, output.as_deref())?;
        }
    }

    Ok(())
}
