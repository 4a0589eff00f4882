use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use statbadge::badge::{self, RunOptions};
use statbadge::config::{Config, CONFIG_FILE};
use statbadge::engine::ReconcileOutcome;
use statbadge::logging::init_logging;
use statbadge::svg::thousands;

#[derive(Parser)]
#[command(name = "statbadge")]
#[command(about = "Refresh GitHub profile statistics badges")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: statbadge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Gather all statistics and patch the SVG templates
    Run {
        /// Recount every repository
        #[arg(long)]
        force: bool,

        /// Do not rewrite the SVG files
        #[arg(long)]
        no_write: bool,

        /// Repositories fetched concurrently (overrides run.workers)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Refresh the lines-of-code cache only
    Loc {
        /// Recount every repository
        #[arg(long)]
        force: bool,

        /// Repositories fetched concurrently (overrides run.workers)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Print the age computed from the configured birthday
    Age,

    /// Show the cache file for the configured user
    Cache,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = Config::load(&config_path)
        .with_context(|| format!("Could not load {}", config_path.display()))?;

    match cli.command {
        Commands::Run {
            force,
            no_write,
            workers,
        } => cmd_run(
            &config,
            RunOptions {
                force,
                no_write,
                workers,
            },
        ),
        Commands::Loc { force, workers } => cmd_loc(&config, force, workers),
        Commands::Age => cmd_age(&config),
        Commands::Cache => cmd_cache(&config),
    }
}

#[tokio::main]
async fn cmd_run(config: &Config, options: RunOptions) -> Result<()> {
    config.validate()?;
    let report = badge::run(config, &options).await?;
    let fields = &report.fields;

    println!("\n{} {}\n", "📊".cyan(), config.github.user.bold());
    println!("  {} {}", "age:".dimmed(), fields.age);
    println!("  {} {}", "commits:".dimmed(), fields.commits);
    println!("  {} {}", "stars:".dimmed(), fields.stars);
    println!(
        "  {} {} {}",
        "repos:".dimmed(),
        fields.repos,
        format!("(contributed to {})", fields.contributed).dimmed()
    );
    println!("  {} {}", "followers:".dimmed(), fields.followers);
    print_loc(&report.outcome);

    for path in &report.written {
        println!("{} {}", "✓".green(), path.display().to_string().green());
    }
    println!(
        "\n{} {}",
        "GraphQL calls:".dimmed(),
        report.graphql_calls.to_string().cyan()
    );
    Ok(())
}

#[tokio::main]
async fn cmd_loc(config: &Config, force: bool, workers: Option<usize>) -> Result<()> {
    config.validate()?;
    let outcome = badge::reconcile_only(config, force, workers).await?;

    println!("\n{} {}\n", "📦".cyan(), config.github.user.bold());
    print_loc(&outcome);
    println!(
        "  {} {}",
        "cached:".dimmed(),
        if outcome.cached {
            "true".green()
        } else {
            "false".yellow()
        }
    );
    println!(
        "  {} {} of {}",
        "recounted:".dimmed(),
        outcome.recounted,
        outcome.repo_count
    );

    let summary = &outcome.summary;
    if summary.is_empty() {
        println!("\n  {}", "No repository changes".dimmed());
        return Ok(());
    }

    println!();
    for name in &summary.new_repos {
        println!("  {} {}", "+".green(), name);
    }
    for hash in &summary.deleted_hashes {
        println!("  {} {}", "-".red(), hash.dimmed());
    }
    for changed in &summary.changed {
        println!(
            "  {} {} {}",
            "~".yellow(),
            changed,
            changed.delta_label().dimmed()
        );
    }
    Ok(())
}

fn print_loc(outcome: &ReconcileOutcome) {
    let totals = &outcome.totals;
    println!(
        "  {} {} ({}{}, {}{})",
        "lines of code:".dimmed(),
        thousands(totals.net()).bold(),
        thousands(totals.additions as i64).green(),
        "++".green(),
        thousands(totals.deletions as i64).red(),
        "--".red()
    );
}

fn cmd_age(config: &Config) -> Result<()> {
    let birthday = config.birthday()?;
    println!("{}", statbadge::age::format_age(birthday, badge::today()));
    Ok(())
}

fn cmd_cache(config: &Config) -> Result<()> {
    if config.github.user.trim().is_empty() {
        anyhow::bail!("Missing GitHub user: set USER_NAME or github.user");
    }
    let store = badge::cache_store(config);
    let cache = store
        .load()
        .with_context(|| format!("Failed to read cache file: {}", store.path().display()))?;

    println!("{} {}", "cache:".dimmed(), store.path().display());
    println!("{} {}", "records:".dimmed(), cache.len());
    Ok(())
}
