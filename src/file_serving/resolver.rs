use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use super::headers::synthesize;
use super::index::Index;
use super::path_utils::{candidates, is_hidden, join_within, probe, url_path};
use super::{FileEntry, FileStats};
use crate::error::ServeError;
use crate::logging::LoggingExt;
use crate::options::ServeOptions;

/// Maps a URL base path plus ordered suffixes to the first matching entry.
pub trait Resolver: Send + Sync {
    fn resolve(&self, base_path: &str, suffixes: &[String]) -> Option<Cow<'_, FileEntry>>;

    fn root(&self) -> &Path;
}

/// Lookups against a prebuilt [`Index`].
#[derive(Debug)]
pub struct IndexedResolver {
    index: Index,
}

impl IndexedResolver {
    pub fn new(index: Index) -> Self {
        Self { index }
    }
}

impl Resolver for IndexedResolver {
    fn resolve(&self, base_path: &str, suffixes: &[String]) -> Option<Cow<'_, FileEntry>> {
        candidates(base_path, suffixes).iter().find_map(|key| {
            let entry = self.index.get(key)?;
            log::debug!("Index hit: {} -> {}", key, entry.abs_path.display());
            Some(Cow::Borrowed(entry))
        })
    }

    fn root(&self) -> &Path {
        self.index.root()
    }
}

/// Per-request filesystem probes. Entries are built on the spot and always
/// revalidate.
#[derive(Debug)]
pub struct LiveResolver {
    root: PathBuf,
    etag: bool,
    dotfiles: bool,
    cache_control: &'static str,
}

impl LiveResolver {
    pub fn new(root: &Path, options: &ServeOptions) -> Result<Self, ServeError> {
        let root = root.log_operation("canonicalize", || fs::canonicalize(root))?;
        Ok(Self {
            root,
            etag: options.etag,
            dotfiles: options.dotfiles,
            cache_control: options.revalidate_cache_control(),
        })
    }

    fn lookup(&self, candidate: &str) -> Option<FileEntry> {
        // Filter on the cleaned path so `..` cannot sneak past the dotfile rule.
        let Some(joined) = join_within(&self.root, candidate) else {
            log::warn!("Path escapes base directory: {}", candidate);
            return None;
        };
        let key = url_path(joined.strip_prefix(&self.root).ok()?);
        if is_hidden(&key, self.dotfiles) {
            log::trace!("Skipping hidden candidate: {}", candidate);
            return None;
        }

        let (abs_path, metadata) = match probe(&self.root, &key) {
            Ok(found) => found?,
            Err(e) => {
                log::debug!("Probe failed for {}: {}", key, e);
                return None;
            }
        };
        let stats = match FileStats::from_metadata(&metadata) {
            Ok(stats) => stats,
            Err(e) => {
                log::debug!("Failed to read stats for {}: {}", abs_path.display(), e);
                return None;
            }
        };

        let mut headers = synthesize(&key, &stats, self.etag);
        headers.set("Cache-Control", self.cache_control);
        log::debug!("Live hit: {} -> {}", key, abs_path.display());
        Some(FileEntry {
            abs_path,
            stats,
            headers,
        })
    }
}

impl Resolver for LiveResolver {
    fn resolve(&self, base_path: &str, suffixes: &[String]) -> Option<Cow<'_, FileEntry>> {
        candidates(base_path, suffixes)
            .iter()
            .find_map(|key| self.lookup(key))
            .map(Cow::Owned)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes() -> Vec<String> {
        ["", ".html", ".htm"].iter().map(|s| s.to_string()).collect()
    }

    fn site() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(root.join("about.html"), "about").unwrap();
        fs::write(root.join("docs/index.htm"), "docs").unwrap();
        fs::write(root.join(".secret"), "shh").unwrap();
        temp
    }

    fn resolvers(root: &Path, options: &ServeOptions) -> Vec<Box<dyn Resolver>> {
        vec![
            Box::new(IndexedResolver::new(Index::build(root, options).unwrap())),
            Box::new(LiveResolver::new(root, options).unwrap()),
        ]
    }

    fn resolved_name(resolver: &dyn Resolver, path: &str) -> Option<String> {
        resolver.resolve(path, &suffixes()).map(|entry| {
            entry
                .abs_path
                .strip_prefix(resolver.root())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
    }

    #[test]
    fn test_both_resolvers_agree() {
        let temp = site();
        for resolver in resolvers(temp.path(), &ServeOptions::default()) {
            let resolver = resolver.as_ref();
            assert_eq!(resolved_name(resolver, "/").as_deref(), Some("index.html"));
            assert_eq!(resolved_name(resolver, "/about").as_deref(), Some("about.html"));
            assert_eq!(resolved_name(resolver, "/docs").as_deref(), Some("docs/index.htm"));
            assert_eq!(resolved_name(resolver, "/docs/").as_deref(), Some("docs/index.htm"));
            assert_eq!(resolved_name(resolver, "/missing"), None);
            assert_eq!(resolved_name(resolver, "/.secret"), None);
        }
    }

    #[test]
    fn test_traversal_never_resolves() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("public");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(temp.path().join("private.txt"), "secret").unwrap();

        for resolver in resolvers(&root, &ServeOptions::default()) {
            let resolver = resolver.as_ref();
            assert_eq!(resolved_name(resolver, "/../private.txt"), None);
            assert_eq!(resolved_name(resolver, "/a/../../private.txt"), None);
        }
    }

    #[test]
    fn test_live_entries_always_revalidate() {
        let temp = site();
        let options = ServeOptions {
            max_age: Some(600),
            etag: true,
            ..Default::default()
        };
        let resolver = LiveResolver::new(temp.path(), &options).unwrap();
        let entry = resolver.resolve("/about", &suffixes()).unwrap();

        assert_eq!(entry.headers.get("Cache-Control"), Some("no-cache"));
        assert!(entry.headers.contains("ETag"));
    }
}
