//! Cache module
//!
//! Provides:
//! - Fixed-shape per-repository records keyed by name hash
//! - Flat-file load/save with an opaque header block

mod record;
mod store;

pub use record::{repo_hash, CacheFile, CacheRecord, DEFAULT_HEADER_LINE, DEFAULT_HEADER_LINES};
pub use store::{cache_file_path, CacheStore};
