//! One full badge refresh: gather every figure, reconcile the line cache and
//! patch the SVG templates.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::time::Instant;

use crate::age::format_age;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::engine::{ReconcileOptions, ReconcileOutcome, Reconciler};
use crate::github::{Affiliation, GitHubClient};
use crate::svg::{overwrite_svg, BadgeFields};

/// Per-invocation switches layered over the config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub force: bool,
    /// Compute everything but leave the SVG files alone
    pub no_write: bool,
    /// Overrides `run.workers`
    pub workers: Option<usize>,
}

#[derive(Debug)]
pub struct BadgeReport {
    pub fields: BadgeFields,
    pub outcome: ReconcileOutcome,
    /// SVG files that were rewritten
    pub written: Vec<PathBuf>,
    pub graphql_calls: u32,
}

fn log_phase(phase: &str, start: Instant) {
    log::info!(
        "calculation_time phase={} duration_s={:.4}",
        phase,
        start.elapsed().as_secs_f64()
    );
}

/// Soft failures keep the run going with a zero.
fn or_zero<E: std::fmt::Display>(what: &str, result: std::result::Result<u64, E>) -> u64 {
    result.unwrap_or_else(|e| {
        log::warn!("{} failed, using 0: {}", what, e);
        0
    })
}

pub fn reconcile_options(config: &Config, force: bool, workers: Option<usize>) -> ReconcileOptions {
    ReconcileOptions {
        force,
        workers: workers.unwrap_or(config.run.workers).max(1),
    }
}

pub fn cache_store(config: &Config) -> CacheStore {
    CacheStore::for_user(&config.cache.dir, &config.github.user, config.cache.header_lines)
}

pub fn client(config: &Config) -> GitHubClient {
    GitHubClient::new(&config.github.api_url, &config.github.token, &config.github.user)
}

pub async fn run(config: &Config, options: &RunOptions) -> Result<BadgeReport> {
    let birthday = config.birthday()?;
    let client = client(config);
    let store = cache_store(config);

    let start = Instant::now();
    let account = client
        .user()
        .await
        .with_context(|| format!("Failed to look up GitHub user '{}'", client.login()))?;
    log_phase("account_data", start);

    let start = Instant::now();
    let age = format_age(birthday, today());
    log_phase("age_calculation", start);

    let start = Instant::now();
    let contributions = or_zero(
        "Contribution count",
        client.contributions(account.created_at, Utc::now()).await,
    );
    log_phase("graph_commits", start);

    let start = Instant::now();
    let (repos, stars) = client
        .repos_and_stars(&[Affiliation::Owner])
        .await
        .unwrap_or_else(|e| {
            log::warn!("Owned repositories and stars failed, using 0: {}", e);
            (0, 0)
        });
    log_phase("repos_and_stars", start);

    let start = Instant::now();
    let outcome = Reconciler::new(&client, &store, &account.id)
        .with_affiliations(&Affiliation::ALL)
        .with_options(reconcile_options(config, options.force, options.workers))
        .run()
        .await?;
    log::info!(
        "calculation_time phase=loc_cache_builder cached={} duration_s={:.4}",
        outcome.cached,
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let followers = or_zero("Follower count", client.followers().await);
    log_phase("follower_count", start);

    let graphql_calls = client.stats().total();
    log::info!("total_graphql_calls count={}", graphql_calls);
    for (name, count) in client.stats().snapshot() {
        log::debug!("graphql_calls query={} count={}", name, count);
    }

    let fields = BadgeFields {
        age,
        commits: contributions,
        stars,
        repos,
        // repositories across every affiliation, not the contribution total
        contributed: outcome.repo_count as u64,
        followers,
        loc_net: outcome.totals.net(),
        loc_add: outcome.totals.additions,
        loc_del: outcome.totals.deletions,
    };

    let mut written = Vec::new();
    if options.no_write {
        log::info!("Skipping SVG output (--no-write)");
    } else {
        let elements = fields.to_elements();
        for path in &config.output.svgs {
            overwrite_svg(path, &elements)?;
            log::info!("Updated {}", path.display());
            written.push(path.clone());
        }
    }

    Ok(BadgeReport {
        fields,
        outcome,
        written,
        graphql_calls,
    })
}

/// Reconciliation on its own, as used by `statbadge loc`.
pub async fn reconcile_only(config: &Config, force: bool, workers: Option<usize>) -> Result<ReconcileOutcome> {
    let client = client(config);
    let store = cache_store(config);

    let account = client
        .user()
        .await
        .with_context(|| format!("Failed to look up GitHub user '{}'", client.login()))?;

    let start = Instant::now();
    let outcome = Reconciler::new(&client, &store, &account.id)
        .with_options(reconcile_options(config, force, workers))
        .run()
        .await?;
    log_phase("loc_cache_builder", start);
    log::info!("total_graphql_calls count={}", client.stats().total());

    Ok(outcome)
}

/// Current calendar date in UTC, independent of the host time zone.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
