//! GraphQL documents and the response shapes they decode into.

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const USER: &str = r#"
query($login: String!) {
  user(login: $login) { id createdAt }
}"#;

pub const FOLLOWERS: &str = r#"
query($login: String!) {
  user(login: $login) { followers { totalCount } }
}"#;

pub const CONTRIBUTIONS: &str = r#"
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar { totalContributions }
    }
  }
}"#;

pub const REPOS_AND_STARS: &str = r#"
query($login: String!, $affs: [RepositoryAffiliation], $cursor: String) {
  user(login: $login) {
    repositories(first: 100, after: $cursor, ownerAffiliations: $affs) {
      totalCount
      edges { node { stargazers { totalCount } } }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

pub const LIST_REPOSITORIES: &str = r#"
query($login: String!, $affs: [RepositoryAffiliation], $cursor: String) {
  user(login: $login) {
    repositories(first: 60, after: $cursor, ownerAffiliations: $affs) {
      edges { node { nameWithOwner } }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

pub const TOTAL_COMMITS: &str = r#"
query($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    defaultBranchRef {
      target { ... on Commit { history { totalCount } } }
    }
  }
}"#;

pub const AUTHOR_HISTORY: &str = r#"
query($owner: String!, $repo: String!, $cursor: String, $author: CommitAuthor) {
  repository(owner: $owner, name: $repo) {
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: 100, after: $cursor, author: $author) {
            totalCount
            edges { node { additions deletions } }
            pageInfo { hasNextPage endCursor }
          }
        }
      }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlMessage>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

// user

#[derive(Debug, Deserialize)]
pub struct UserData<U> {
    pub user: Option<U>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNode {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FollowersNode {
    pub followers: TotalCount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsNode {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u64,
}

// repositories

#[derive(Debug, Deserialize)]
pub struct RepositoriesNode<N> {
    pub repositories: RepositoryConnection<N>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConnection<N> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct StarNode {
    pub stargazers: TotalCount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameNode {
    pub name_with_owner: String,
}

// history

#[derive(Debug, Deserialize)]
pub struct RepositoryData<H> {
    pub repository: Option<RepositoryNode<H>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode<H> {
    pub default_branch_ref: Option<BranchRef<H>>,
}

#[derive(Debug, Deserialize)]
pub struct BranchRef<H> {
    pub target: Option<CommitTarget<H>>,
}

/// `target` is `{}` when the ref does not point at a commit.
#[derive(Debug, Deserialize)]
pub struct CommitTarget<H> {
    pub history: Option<H>,
}

impl<H> RepositoryData<H> {
    /// The default branch history, or `None` for empty repositories.
    pub fn into_history(self) -> Option<H> {
        self.repository?.default_branch_ref?.target?.history
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorHistory {
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<LineDelta>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct LineDelta {
    pub additions: u64,
    pub deletions: u64,
}
