//! Incremental reconciliation of the lines-of-code cache.
//!
//! Every run re-fetches each repository's default-branch commit count; the
//! expensive author-filtered history walk only happens for repositories that
//! are new, whose commit count moved, or when a rebuild is forced. Unchanged
//! repositories keep their previous record as is.

use futures::{stream, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};

use super::summary::{ChangeSummary, ChangedRepo, LineTotals};
use crate::cache::{repo_hash, CacheRecord, CacheStore};
use crate::error::ReconcileError;
use crate::github::{Affiliation, RepoName, RepoSource};

/// Options for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Recount every repository regardless of cached commit counts
    pub force: bool,
    /// Repositories processed concurrently (1 = strictly sequential)
    pub workers: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            force: false,
            workers: 1,
        }
    }
}

/// Result of a successful run. The cache file has already been rewritten.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub totals: LineTotals,
    /// Repository count unchanged and no forced rebuild. Says nothing about
    /// which repositories were recounted.
    pub cached: bool,
    pub summary: ChangeSummary,
    pub repo_count: usize,
    pub recounted: usize,
    /// Persisted records, in enumeration order.
    pub records: Vec<CacheRecord>,
}

struct Processed {
    name: String,
    record: CacheRecord,
    previous: Option<CacheRecord>,
    recounted: bool,
}

pub struct Reconciler<'a, S> {
    source: &'a S,
    store: &'a CacheStore,
    author_id: &'a str,
    affiliations: Vec<Affiliation>,
    options: ReconcileOptions,
}

impl<'a, S: RepoSource> Reconciler<'a, S> {
    pub fn new(source: &'a S, store: &'a CacheStore, author_id: &'a str) -> Self {
        Self {
            source,
            store,
            author_id,
            affiliations: Affiliation::ALL.to_vec(),
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_affiliations(mut self, affiliations: &[Affiliation]) -> Self {
        self.affiliations = affiliations.to_vec();
        self
    }

    /// Load the cache, refresh it against the current repositories and save it.
    ///
    /// Any fetch failure aborts before the save, leaving the file on disk untouched.
    pub async fn run(&self) -> Result<ReconcileOutcome, ReconcileError> {
        let mut cache = self.store.load().map_err(|source| ReconcileError::LoadCache {
            path: self.store.path().to_path_buf(),
            source,
        })?;
        let previous: Vec<CacheRecord> = cache.records().to_vec();
        let old: HashMap<&str, &CacheRecord> =
            previous.iter().map(|r| (r.hash.as_str(), r)).collect();

        let names = self
            .source
            .list_repositories(&self.affiliations)
            .await
            .map_err(ReconcileError::Enumerate)?;
        // a page shifting mid-enumeration can list the same repository twice
        let mut seen = HashSet::new();
        let repos = names
            .iter()
            .filter(|name| {
                let first = seen.insert(name.as_str());
                if !first {
                    log::debug!("{name}: listed more than once, keeping the first");
                }
                first
            })
            .map(|name| {
                name.parse::<RepoName>()
                    .map(|repo| (name.as_str(), repo))
                    .map_err(ReconcileError::InvalidRepoName)
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("Enumerated {} repositories", repos.len());

        let old_ref = &old;
        let processed: Vec<Processed> = stream::iter(repos.iter())
            .map(move |(name, repo)| self.process(name, repo, old_ref))
            .buffered(self.options.workers.max(1))
            .try_collect()
            .await?;

        let summary = summarize(&processed, &previous);
        summary.log();

        let recounted = processed.iter().filter(|p| p.recounted).count();
        let repo_count = processed.len();
        let cached = repo_count == previous.len() && !self.options.force;

        cache.set_records(processed.into_iter().map(|p| p.record).collect());
        self.store
            .save(&cache)
            .map_err(|source| ReconcileError::SaveCache {
                path: self.store.path().to_path_buf(),
                source,
            })?;

        Ok(ReconcileOutcome {
            totals: LineTotals::from_records(cache.records()),
            cached,
            summary,
            repo_count,
            recounted,
            records: cache.records().to_vec(),
        })
    }

    async fn process(
        &self,
        name: &str,
        repo: &RepoName,
        old: &HashMap<&str, &CacheRecord>,
    ) -> Result<Processed, ReconcileError> {
        let hash = repo_hash(name);
        let commit_count = self
            .source
            .total_commit_count(repo)
            .await
            .map_err(|source| ReconcileError::CommitCount {
                repo: name.to_string(),
                source,
            })?;

        let previous = old.get(hash.as_str()).map(|r| (*r).clone());
        let reuse = match &previous {
            Some(prev) => !self.options.force && prev.commit_count == commit_count,
            None => false,
        };

        let record = match (&previous, reuse) {
            (Some(prev), true) => {
                log::debug!("{name}: {commit_count} commits, reusing cached counts");
                prev.clone()
            }
            _ => {
                log::debug!("{name}: {commit_count} commits, recounting");
                let stats = self
                    .source
                    .author_commit_stats(repo, self.author_id)
                    .await
                    .map_err(|source| ReconcileError::Recount {
                        repo: name.to_string(),
                        source,
                    })?;
                CacheRecord {
                    hash,
                    commit_count,
                    my_commits: stats.commits,
                    additions: stats.additions,
                    deletions: stats.deletions,
                }
            }
        };

        Ok(Processed {
            name: name.to_string(),
            record,
            previous,
            recounted: !reuse,
        })
    }
}

fn summarize(processed: &[Processed], previous: &[CacheRecord]) -> ChangeSummary {
    let mut summary = ChangeSummary::default();

    for p in processed {
        match &p.previous {
            None => summary.new_repos.push(p.name.clone()),
            Some(old) if old.commit_count != p.record.commit_count => {
                summary.changed.push(ChangedRepo {
                    name: p.name.clone(),
                    old_commits: old.commit_count,
                    new_commits: p.record.commit_count,
                    additions_delta: p.record.additions as i64 - old.additions as i64,
                    deletions_delta: p.record.deletions as i64 - old.deletions as i64,
                });
            }
            Some(_) => {}
        }
    }

    let current: HashSet<&str> = processed.iter().map(|p| p.record.hash.as_str()).collect();
    summary.deleted_hashes = previous
        .iter()
        .filter(|r| !current.contains(r.hash.as_str()))
        .map(|r| r.hash.clone())
        .collect();

    summary
}
