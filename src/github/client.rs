//! GitHub GraphQL client

use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::queries::{self, *};
use super::stats::{QueryKind, QueryStats};
use super::{Affiliation, AuthorStats, RepoName, RepoSource};
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// The tracked account.
#[derive(Debug, Clone)]
pub struct UserAccount {
    /// GraphQL node id, used as the commit author filter.
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Authenticated client for one run. Counts every operation it performs.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    login: String,
    stats: QueryStats,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str, login: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.to_string(),
            token: token.to_string(),
            login: login.to_string(),
            stats: QueryStats::new(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> ApiResult<T> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("bearer {}", self.token))
            .header("User-Agent", "statbadge")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.errors.is_empty() {
            return Err(ApiError::GraphQl(
                envelope.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        envelope.data.ok_or(ApiError::MissingData)
    }

    async fn user_query<U: DeserializeOwned>(&self, query: &str, variables: Value) -> ApiResult<U> {
        let data: UserData<U> = self.query(query, variables).await?;
        data.user.ok_or(ApiError::MissingData)
    }

    /// Node id and creation time of the tracked account.
    pub async fn user(&self) -> ApiResult<UserAccount> {
        self.stats.record(QueryKind::User);
        let node: UserNode = self
            .user_query(queries::USER, json!({ "login": self.login }))
            .await?;
        Ok(UserAccount {
            id: node.id,
            created_at: node.created_at,
        })
    }

    pub async fn followers(&self) -> ApiResult<u64> {
        self.stats.record(QueryKind::Followers);
        let node: FollowersNode = self
            .user_query(queries::FOLLOWERS, json!({ "login": self.login }))
            .await?;
        Ok(node.followers.total_count)
    }

    /// Contribution calendar total between `from` and `to`.
    ///
    /// The API caps a collection at one year, so the range is walked in
    /// yearly windows.
    pub async fn contributions(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> ApiResult<u64> {
        self.stats.record(QueryKind::Contributions);
        let mut total = 0;
        for (start, end) in year_windows(from, to) {
            let node: ContributionsNode = self
                .user_query(
                    queries::CONTRIBUTIONS,
                    json!({
                        "login": self.login,
                        "from": start.to_rfc3339_opts(SecondsFormat::Secs, true),
                        "to": end.to_rfc3339_opts(SecondsFormat::Secs, true),
                    }),
                )
                .await?;
            total += node
                .contributions_collection
                .contribution_calendar
                .total_contributions;
        }
        Ok(total)
    }

    /// Repository count and total stargazers under `affiliations`.
    pub async fn repos_and_stars(&self, affiliations: &[Affiliation]) -> ApiResult<(u64, u64)> {
        self.stats.record(QueryKind::ReposAndStars);
        let mut cursor: Option<String> = None;
        let mut stars = 0;
        loop {
            let node: RepositoriesNode<StarNode> = self
                .user_query(
                    queries::REPOS_AND_STARS,
                    json!({ "login": self.login, "affs": affiliations, "cursor": cursor }),
                )
                .await?;
            let page = node.repositories;
            stars += page
                .edges
                .iter()
                .map(|e| e.node.stargazers.total_count)
                .sum::<u64>();
            match next_cursor(page.page_info) {
                Some(next) => cursor = Some(next),
                None => return Ok((page.total_count, stars)),
            }
        }
    }
}

impl RepoSource for GitHubClient {
    async fn list_repositories(&self, affiliations: &[Affiliation]) -> ApiResult<Vec<String>> {
        self.stats.record(QueryKind::ListRepositories);
        let mut cursor: Option<String> = None;
        let mut names = Vec::new();
        loop {
            let node: RepositoriesNode<NameNode> = self
                .user_query(
                    queries::LIST_REPOSITORIES,
                    json!({ "login": self.login, "affs": affiliations, "cursor": cursor }),
                )
                .await?;
            let page = node.repositories;
            names.extend(page.edges.into_iter().map(|e| e.node.name_with_owner));
            match next_cursor(page.page_info) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(names)
    }

    async fn total_commit_count(&self, repo: &RepoName) -> ApiResult<u64> {
        self.stats.record(QueryKind::TotalCommits);
        let data: RepositoryData<TotalCount> = self
            .query(
                queries::TOTAL_COMMITS,
                json!({ "owner": repo.owner, "repo": repo.name }),
            )
            .await?;
        Ok(data.into_history().map(|h| h.total_count).unwrap_or(0))
    }

    async fn author_commit_stats(&self, repo: &RepoName, author_id: &str) -> ApiResult<AuthorStats> {
        self.stats.record(QueryKind::AuthorStats);
        let mut cursor: Option<String> = None;
        let mut stats = AuthorStats::default();
        loop {
            let data: RepositoryData<AuthorHistory> = self
                .query(
                    queries::AUTHOR_HISTORY,
                    json!({
                        "owner": repo.owner,
                        "repo": repo.name,
                        "cursor": cursor,
                        "author": { "id": author_id },
                    }),
                )
                .await?;
            let Some(history) = data.into_history() else {
                break;
            };
            stats.commits = history.total_count;
            for edge in &history.edges {
                stats.additions += edge.node.additions;
                stats.deletions += edge.node.deletions;
            }
            match next_cursor(history.page_info) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(stats)
    }
}

fn next_cursor(page: PageInfo) -> Option<String> {
    if page.has_next_page {
        page.end_cursor
    } else {
        None
    }
}

/// Consecutive windows of at most one year covering `[from, to)`.
fn year_windows(from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut windows = Vec::new();
    let mut current = from;
    while current < to {
        let next = current
            .checked_add_months(Months::new(12))
            .map_or(to, |n| n.min(to));
        windows.push((current, next));
        current = next;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_year_windows_cover_range() {
        let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2022, 9, 15, 0, 0, 0).unwrap();
        let windows = year_windows(from, to);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].0, from);
        assert_eq!(windows[0].1, Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(windows[2].1, to);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_year_windows_empty_when_reversed() {
        let from = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert!(year_windows(from, to).is_empty());
        assert!(year_windows(from, from).is_empty());
    }

    #[test]
    fn test_next_cursor() {
        let more = PageInfo {
            has_next_page: true,
            end_cursor: Some("c1".to_string()),
        };
        let done = PageInfo {
            has_next_page: false,
            end_cursor: Some("c2".to_string()),
        };
        assert_eq!(next_cursor(more), Some("c1".to_string()));
        assert_eq!(next_cursor(done), None);
    }
}
