//! Flat-file persistence for the per-user cache.
//!
//! File layout (UTF-8, newline separated):
//!
//! ```text
//! <header line 1>
//! ...
//! <header line N>
//! <hex hash> <commit_count> <my_commits> <additions> <deletions>
//! ...
//! ```
//!
//! The header block is opaque and written back verbatim. Record lines that do
//! not parse are dropped on load.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::record::{CacheFile, CacheRecord, DEFAULT_HEADER_LINE};

pub struct CacheStore {
    path: PathBuf,
    header_lines: usize,
}

impl CacheStore {
    pub fn new(path: PathBuf, header_lines: usize) -> Self {
        Self { path, header_lines }
    }

    /// Store for `user` under `cache_dir`, named after the SHA-256 of the login.
    pub fn for_user(cache_dir: &Path, user: &str, header_lines: usize) -> Self {
        Self::new(cache_file_path(cache_dir, user), header_lines)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache. A missing file yields an empty cache with a default header.
    pub fn load(&self) -> io::Result<CacheFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No cache at {}, starting cold", self.path.display());
                return Ok(CacheFile::with_default_header(self.header_lines));
            }
            Err(e) => return Err(e),
        };
        Ok(self.parse(&content))
    }

    fn parse(&self, content: &str) -> CacheFile {
        let mut lines = content.lines();

        let mut header: Vec<String> = lines
            .by_ref()
            .take(self.header_lines)
            .map(str::to_string)
            .collect();
        header.resize(self.header_lines, DEFAULT_HEADER_LINE.to_string());

        let mut file = CacheFile::new(header);
        for (offset, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match CacheRecord::parse_line(line) {
                Some(record) => file.insert(record),
                None => log::debug!(
                    "Skipping malformed cache line {} in {}",
                    self.header_lines + offset + 1,
                    self.path.display()
                ),
            }
        }
        file
    }

    /// Write header and records, replacing the previous file.
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// target, so readers never observe a half-written cache.
    pub fn save(&self, file: &CacheFile) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let mut content = String::new();
        for line in &file.header {
            content.push_str(line);
            content.push('\n');
        }
        for record in file.records() {
            content.push_str(&record.to_line());
            content.push('\n');
        }

        let tmp = self.path.with_extension("txt.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// `<cache_dir>/<sha256(user)>.txt`
pub fn cache_file_path(cache_dir: &Path, user: &str) -> PathBuf {
    let digest = Sha256::digest(user.as_bytes());
    cache_dir.join(format!("{}.txt", hex::encode(digest)))
}
