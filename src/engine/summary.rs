//! Run results: line totals and the change summary.

use crate::cache::CacheRecord;

/// Aggregate line counts over every current record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTotals {
    pub additions: u64,
    pub deletions: u64,
}

impl LineTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CacheRecord>) -> Self {
        records.into_iter().fold(Self::default(), |acc, r| Self {
            additions: acc.additions + r.additions,
            deletions: acc.deletions + r.deletions,
        })
    }

    /// additions - deletions
    pub fn net(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }
}

/// A repository whose default-branch commit count moved since the last run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRepo {
    pub name: String,
    pub old_commits: u64,
    pub new_commits: u64,
    pub additions_delta: i64,
    pub deletions_delta: i64,
}

/// What changed between the previous cache and this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// `owner/name` of repositories with no previous record, in enumeration order.
    pub new_repos: Vec<String>,
    /// Hashes of previous records with no current repository, in cache file order.
    pub deleted_hashes: Vec<String>,
    /// Repositories with a different commit count, in enumeration order.
    pub changed: Vec<ChangedRepo>,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.new_repos.is_empty() && self.deleted_hashes.is_empty() && self.changed.is_empty()
    }

    /// Net additions contributed by the changed repositories.
    pub fn additions_delta(&self) -> i64 {
        self.changed.iter().map(|c| c.additions_delta).sum()
    }

    /// Net deletions contributed by the changed repositories.
    pub fn deletions_delta(&self) -> i64 {
        self.changed.iter().map(|c| c.deletions_delta).sum()
    }

    /// Emit one info line per non-empty category.
    pub fn log(&self) {
        if !self.new_repos.is_empty() {
            log::info!("new repos: {}", self.new_repos.join(", "));
        }
        if !self.deleted_hashes.is_empty() {
            log::info!("deleted repos: {}", self.deleted_hashes.join(", "));
        }
        if !self.changed.is_empty() {
            let repos: Vec<String> = self.changed.iter().map(ChangedRepo::to_string).collect();
            log::info!(
                "repos with changed commits: {} lines_added={} lines_removed={}",
                repos.join(", "),
                self.additions_delta(),
                self.deletions_delta()
            );
        }
    }
}

impl ChangedRepo {
    /// Signed line deltas, e.g. `+30 -2` or `-4 +0`.
    pub fn delta_label(&self) -> String {
        format!("{:+} {:+}", self.additions_delta, self.deletions_delta)
    }
}

impl std::fmt::Display for ChangedRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}→{})", self.name, self.old_commits, self.new_commits)
    }
}
