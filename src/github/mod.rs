//! GitHub module
//!
//! Provides:
//! - The `RepoSource` queries the reconciliation engine depends on
//! - A reqwest-based GraphQL client implementing them
//! - Per-run query accounting

mod client;
mod queries;
mod stats;

pub use client::{GitHubClient, UserAccount, DEFAULT_API_URL};
pub use stats::{QueryKind, QueryStats};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ApiResult;

/// Relationship between the tracked user and a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Affiliation {
    Owner,
    Collaborator,
    OrganizationMember,
}

impl Affiliation {
    /// Every affiliation; the scope used for the lines-of-code cache.
    pub const ALL: [Affiliation; 3] = [
        Affiliation::Owner,
        Affiliation::Collaborator,
        Affiliation::OrganizationMember,
    ];
}

/// A repository's `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Commits and line deltas attributed to one author in one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorStats {
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

/// Read-only queries the reconciliation engine needs from GitHub.
///
/// Implementations paginate internally and return complete results; any
/// error is fatal for the current run.
#[allow(async_fn_in_trait)]
pub trait RepoSource {
    /// `owner/name` of every repository visible under `affiliations`, in API order.
    async fn list_repositories(&self, affiliations: &[Affiliation]) -> ApiResult<Vec<String>>;

    /// Commits on the default branch across all authors; 0 without a default branch.
    async fn total_commit_count(&self, repo: &RepoName) -> ApiResult<u64>;

    /// Default-branch commits by `author_id`, with their summed line deltas.
    async fn author_commit_stats(&self, repo: &RepoName, author_id: &str) -> ApiResult<AuthorStats>;
}
