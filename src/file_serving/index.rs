use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use super::headers::synthesize;
use super::path_utils::{is_hidden, url_path};
use super::{FileEntry, FileStats};
use crate::error::ServeError;
use crate::logging::LoggingExt;
use crate::options::ServeOptions;

/// Immutable snapshot of every servable file under a root, keyed by URL path.
#[derive(Debug, Default)]
pub struct Index {
    root: PathBuf,
    entries: HashMap<String, FileEntry>,
}

impl Index {
    /// Scans `root` recursively. Any I/O failure aborts the whole build.
    ///
    /// Symlinks are followed; links whose target lies outside the root, and
    /// dangling or looping links, are skipped.
    pub fn build(root: &Path, options: &ServeOptions) -> Result<Self, ServeError> {
        let start_time = Instant::now();
        let root = root.log_operation("canonicalize", || fs::canonicalize(root))?;
        let cache_control = options.cache_control();
        let mut entries = HashMap::new();

        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_broken_link(&e) => {
                    log::warn!("Skipping unusable link: {}", e);
                    continue;
                }
                Err(source) => {
                    return Err(ServeError::IndexBuild {
                        path: root.clone(),
                        source,
                    })
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !fs::canonicalize(entry.path())?.starts_with(&root) {
                log::warn!("Link escapes base directory: {}", entry.path().display());
                continue;
            }

            let rel = match entry.path().strip_prefix(&root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let key = url_path(rel);
            if is_hidden(&key, options.dotfiles) {
                log::trace!("Skipping hidden file: {}", key);
                continue;
            }

            let metadata = entry.metadata().map_err(|source| ServeError::IndexBuild {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let stats = FileStats::from_metadata(&metadata)?;
            let mut headers = synthesize(&key, &stats, options.etag);
            headers.set("Cache-Control", cache_control.as_str());

            log::trace!("Indexed {} -> {}", key, entry.path().display());
            entries.insert(
                key,
                FileEntry {
                    abs_path: entry.into_path(),
                    stats,
                    headers,
                },
            );
        }

        log::info!(
            "Indexed {} files under {} in {:?}",
            entries.len(),
            root.display(),
            start_time.elapsed()
        );
        Ok(Self { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, url_path: &str) -> Option<&FileEntry> {
        self.entries.get(url_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn is_broken_link(err: &walkdir::Error) -> bool {
    err.loop_ancestor().is_some()
        || err
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
