//! Per-run GraphQL call accounting

use std::sync::atomic::{AtomicU32, Ordering};

/// Operations counted by `QueryStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    User,
    Followers,
    Contributions,
    ReposAndStars,
    ListRepositories,
    TotalCommits,
    AuthorStats,
}

impl QueryKind {
    pub const ALL: [QueryKind; 7] = [
        QueryKind::User,
        QueryKind::Followers,
        QueryKind::Contributions,
        QueryKind::ReposAndStars,
        QueryKind::ListRepositories,
        QueryKind::TotalCommits,
        QueryKind::AuthorStats,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QueryKind::User => "user_getter",
            QueryKind::Followers => "follower_getter",
            QueryKind::Contributions => "graph_commits",
            QueryKind::ReposAndStars => "graph_repos_stars",
            QueryKind::ListRepositories => "cache_builder",
            QueryKind::TotalCommits => "repo_total_commits",
            QueryKind::AuthorStats => "recursive_loc",
        }
    }
}

/// Call counts for one run. Owned by whoever owns the client for that run.
#[derive(Debug, Default)]
pub struct QueryStats {
    counts: [AtomicU32; 7],
}

impl QueryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: QueryKind) {
        self.counts[kind as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, kind: QueryKind) -> u32 {
        self.counts[kind as usize].load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u32 {
        QueryKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    /// `(name, count)` for every operation, in a fixed order.
    pub fn snapshot(&self) -> Vec<(&'static str, u32)> {
        QueryKind::ALL.iter().map(|k| (k.name(), self.get(*k))).collect()
    }
}
