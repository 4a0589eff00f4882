//! Cache rows and their line format.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Number of opaque comment lines at the top of every cache file.
pub const DEFAULT_HEADER_LINES: usize = 7;

/// Placeholder written for each header line of a fresh cache file.
pub const DEFAULT_HEADER_LINE: &str = "# comment";

/// Hex SHA-256 of a repository's `owner/name`.
///
/// The key is only ever derived from the current name, so a renamed
/// repository shows up as one deleted and one new entry.
pub fn repo_hash(name_with_owner: &str) -> String {
    hex::encode(Sha256::digest(name_with_owner.as_bytes()))
}

/// One repository's cached counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub hash: String,
    /// Commits on the default branch, all authors.
    pub commit_count: u64,
    /// Commits authored by the tracked user.
    pub my_commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl CacheRecord {
    /// Parse `<hash> <commits> <my_commits> <additions> <deletions>`.
    ///
    /// Returns `None` for lines with fewer than five fields or with a count
    /// that is not a non-negative integer. Extra trailing fields are ignored.
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return None;
        }
        Some(Self {
            hash: fields[0].to_string(),
            commit_count: fields[1].parse().ok()?,
            my_commits: fields[2].parse().ok()?,
            additions: fields[3].parse().ok()?,
            deletions: fields[4].parse().ok()?,
        })
    }

    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.hash, self.commit_count, self.my_commits, self.additions, self.deletions
        )
    }
}

/// Header block plus records, in insertion order, at most one per hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFile {
    pub header: Vec<String>,
    records: Vec<CacheRecord>,
}

impl CacheFile {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    /// An empty cache with `header_lines` placeholder comment lines.
    pub fn with_default_header(header_lines: usize) -> Self {
        Self::new(vec![DEFAULT_HEADER_LINE.to_string(); header_lines])
    }

    /// Insert a record, replacing an existing one with the same hash in place.
    pub fn insert(&mut self, record: CacheRecord) {
        match self.records.iter_mut().find(|r| r.hash == record.hash) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Replace all records, keeping the header.
    pub fn set_records(&mut self, records: Vec<CacheRecord>) {
        self.records.clear();
        for record in records {
            self.insert(record);
        }
    }

    pub fn records(&self) -> &[CacheRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records keyed by hash.
    pub fn by_hash(&self) -> HashMap<&str, &CacheRecord> {
        self.records.iter().map(|r| (r.hash.as_str(), r)).collect()
    }
}
