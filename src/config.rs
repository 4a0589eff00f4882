//! Configuration: optional `statbadge.toml` plus environment overrides.
//!
//! ```toml
//! [github]
//! user = "octocat"
//! token = "${ACCESS_TOKEN}"
//!
//! [profile]
//! birthday = "1990-04-01"
//!
//! [cache]
//! dir = "cache"
//!
//! [output]
//! svgs = ["dark_mode.svg", "light_mode.svg"]
//!
//! [run]
//! workers = 4
//! ```
//!
//! `ACCESS_TOKEN`, `USER_NAME` and `DATE_OF_BIRTH` override the file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_HEADER_LINES;
use crate::github::DEFAULT_API_URL;

pub const CONFIG_FILE: &str = "statbadge.toml";

pub const ENV_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_USER: &str = "USER_NAME";
pub const ENV_BIRTHDAY: &str = "DATE_OF_BIRTH";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Deserialize)]
pub struct GithubConfig {
    /// Login of the tracked account
    #[serde(default)]
    pub user: String,
    /// API token (can use env var like ${ACCESS_TOKEN})
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            token: String::new(),
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileConfig {
    /// YYYY-MM-DD
    #[serde(default)]
    pub birthday: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            header_lines: default_header_lines(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Templates patched in place
    #[serde(default = "default_svgs")]
    pub svgs: Vec<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            svgs: default_svgs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// Repositories fetched concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_header_lines() -> usize {
    DEFAULT_HEADER_LINES
}

fn default_svgs() -> Vec<PathBuf> {
    vec![PathBuf::from("dark_mode.svg"), PathBuf::from("light_mode.svg")]
}

fn default_workers() -> usize {
    1
}

impl Config {
    /// Read `path` if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            log::debug!("No config file at {}, using environment only", path.display());
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.expand_vars()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.github.token = token;
        }
        if let Some(user) = var(ENV_USER).filter(|v| !v.is_empty()) {
            self.github.user = user;
        }
        if let Some(birthday) = var(ENV_BIRTHDAY).filter(|v| !v.is_empty()) {
            self.profile.birthday = Some(birthday);
        }
    }

    fn expand_vars(&mut self) -> Result<()> {
        self.github.token = shellexpand::env(&self.github.token)
            .context("Failed to expand github.token")?
            .into_owned();
        self.github.user = shellexpand::env(&self.github.user)
            .context("Failed to expand github.user")?
            .into_owned();
        Ok(())
    }

    /// Checks needed before talking to GitHub.
    pub fn validate(&self) -> Result<()> {
        if self.github.token.trim().is_empty() {
            anyhow::bail!("Missing GitHub token: set {} or github.token", ENV_TOKEN);
        }
        if self.github.user.trim().is_empty() {
            anyhow::bail!("Missing GitHub user: set {} or github.user", ENV_USER);
        }
        if self.run.workers == 0 {
            anyhow::bail!("run.workers must be at least 1");
        }
        self.birthday()?;
        Ok(())
    }

    pub fn birthday(&self) -> Result<NaiveDate> {
        let raw = self.profile.birthday.as_deref().with_context(|| {
            format!(
                "Missing date of birth: set {} or profile.birthday (expected YYYY-MM-DD)",
                ENV_BIRTHDAY
            )
        })?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date of birth '{}' (expected YYYY-MM-DD)", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[github]
user = "octocat"
token = "abc"

[profile]
birthday = "1990-04-01"

[cache]
dir = ".stats-cache"

[output]
svgs = ["badge.svg"]

[run]
workers = 4
"#;

        let config = Config::parse(toml_content).unwrap();
        assert_eq!(config.github.user, "octocat");
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
        assert_eq!(config.cache.dir, PathBuf::from(".stats-cache"));
        assert_eq!(config.cache.header_lines, DEFAULT_HEADER_LINES);
        assert_eq!(config.output.svgs, vec![PathBuf::from("badge.svg")]);
        assert_eq!(config.run.workers, 4);
        assert_eq!(
            config.birthday().unwrap(),
            NaiveDate::from_ymd_opt(1990, 4, 1).unwrap()
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert_eq!(config.output.svgs.len(), 2);
        assert_eq!(config.run.workers, 1);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::parse("[github]\nuser = \"from-file\"\n").unwrap();
        config.apply_env(env(&[
            (ENV_USER, "from-env"),
            (ENV_TOKEN, "secret"),
            (ENV_BIRTHDAY, "2000-02-29"),
        ]));

        assert_eq!(config.github.user, "from-env");
        assert_eq!(config.github.token, "secret");
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_env_does_not_override() {
        let mut config = Config::parse("[github]\nuser = \"from-file\"\n").unwrap();
        config.apply_env(env(&[(ENV_USER, "")]));
        assert_eq!(config.github.user, "from-file");
    }

    #[test]
    fn test_validate_reports_missing_values() {
        let mut config = Config::default();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(ENV_TOKEN));

        config.github.token = "t".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(ENV_USER));

        config.github.user = "u".to_string();
        let err = format!("{:#}", config.validate().unwrap_err());
        assert!(err.contains(ENV_BIRTHDAY));

        config.profile.birthday = Some("01/02/1990".to_string());
        let err = format!("{:#}", config.validate().unwrap_err());
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
    }
}
