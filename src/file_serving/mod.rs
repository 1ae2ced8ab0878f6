pub mod handlers;
pub mod headers;
pub mod index;
pub mod path_utils;
pub mod range;
pub mod resolver;
pub mod spa;

use std::fs::Metadata;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::http::Headers;

/// Size and modification time of a servable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub size: u64,
    pub modified: SystemTime,
}

impl FileStats {
    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified()?,
        })
    }

    pub fn modified_millis(&self) -> u128 {
        self.modified
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

/// One servable asset: where it lives, its stats, and its base headers.
///
/// `headers` is never mutated once built; responses work on a clone.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub abs_path: PathBuf,
    pub stats: FileStats,
    pub headers: Headers,
}
