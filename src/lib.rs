//! statbadge - GitHub profile statistics badge
//!
//! A library for refreshing profile SVG badges with:
//! - GitHub GraphQL queries for account, stars, followers and contributions
//! - An incremental lines-of-code cache keyed by repository
//! - Bounded parallel recounting with deterministic output
//! - In-place patching of SVG templates by element id

pub mod age;
pub mod badge;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod github;
pub mod logging;
pub mod svg;

pub use cache::{CacheFile, CacheRecord, CacheStore};
pub use engine::{ChangeSummary, LineTotals, ReconcileOptions, ReconcileOutcome, Reconciler};
pub use error::{ApiError, ReconcileError};
pub use github::{GitHubClient, RepoName, RepoSource};
