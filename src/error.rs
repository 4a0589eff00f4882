//! Error types for the GitHub transport and the cache reconciliation.

use std::path::PathBuf;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure talking to the GitHub GraphQL endpoint.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GitHub API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("GraphQL response contained no data")]
    MissingData,
}

/// Failure of one reconciliation run, tagged with the phase that failed.
///
/// Every variant aborts the run before the cache file is rewritten.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("failed to load cache {}: {source}", path.display())]
    LoadCache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to enumerate repositories: {0}")]
    Enumerate(#[source] ApiError),
    #[error("invalid repository name '{0}', expected owner/name")]
    InvalidRepoName(String),
    #[error("failed to fetch total commit count for {repo}: {source}")]
    CommitCount {
        repo: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to recount lines for {repo}: {source}")]
    Recount {
        repo: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to save cache {}: {source}", path.display())]
    SaveCache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
