use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use unicode_normalization::UnicodeNormalization;

const WELL_KNOWN: &str = ".well-known";

/// Turns a raw request target into the URL path used for lookups.
///
/// The query string is dropped. Percent-decoding failures are swallowed and
/// the encoded path is used as-is.
pub fn decode_request_path(request_path: &str) -> String {
    let path_without_query = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or(request_path);

    let decoded = if path_without_query.contains('%') {
        match percent_decode_str(path_without_query).decode_utf8() {
            Ok(p) => p.into_owned(),
            Err(e) => {
                log::debug!("Failed to decode path {}: {}", path_without_query, e);
                path_without_query.to_string()
            }
        }
    } else {
        path_without_query.to_string()
    };

    decoded.nfc().collect()
}

/// Lookup keys for `base_path`, in priority order: for each suffix the
/// plain form then the `/index` form. The plain form is skipped for the
/// root so `/` maps to `/index<suffix>`.
pub fn candidates(base_path: &str, suffixes: &[String]) -> Vec<String> {
    let base = base_path.strip_suffix('/').unwrap_or(base_path);
    let index = format!("{}/index", base);

    let mut keys = Vec::with_capacity(suffixes.len() * 2);
    for suffix in suffixes {
        if !base.is_empty() {
            keys.push(format!("{}{}", base, suffix));
        }
        keys.push(format!("{}{}", index, suffix));
    }
    keys
}

/// URL key for a file at `rel` below the served root.
pub fn url_path(rel: &Path) -> String {
    let joined = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined).nfc().collect()
}

/// Whether a URL path names a dotfile (or sits under a dot-directory) that
/// must not be served. `.well-known` is always served, but only while no
/// later `..` segment can climb back out of it.
pub fn is_hidden(url_path: &str, dotfiles: bool) -> bool {
    if dotfiles {
        return false;
    }
    let segments: Vec<&str> = url_path.split('/').filter(|s| !s.is_empty()).collect();
    if let Some((first, rest)) = segments.split_first() {
        if *first == WELL_KNOWN && !rest.is_empty() && !rest.contains(&"..") {
            return false;
        }
    }
    segments.iter().any(|s| s.starts_with('.'))
}

/// Joins a URL key onto `root` lexically. Returns `None` when a `..`
/// segment would climb above the root.
pub fn join_within(root: &Path, url_path: &str) -> Option<PathBuf> {
    let mut cleaned = PathBuf::new();
    for component in Path::new(url_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => cleaned.push(part),
            Component::ParentDir => {
                if !cleaned.pop() {
                    return None;
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let joined = root.join(&cleaned);
    joined.starts_with(root).then_some(joined)
}

/// Probes `url_path` under the canonical `root`. Yields the file path and
/// its metadata when it exists as a non-directory and, after resolving
/// symlinks, still lies within the root.
pub fn probe(root: &Path, url_path: &str) -> io::Result<Option<(PathBuf, Metadata)>> {
    let Some(requested_path) = join_within(root, url_path) else {
        log::warn!("Path escapes base directory: {}", url_path);
        return Ok(None);
    };

    let canonical = match fs::canonicalize(&requested_path) {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if !canonical.starts_with(root) {
        log::warn!("Path escapes base directory: {}", canonical.display());
        return Ok(None);
    }

    let metadata = fs::metadata(&canonical)?;
    if metadata.is_dir() {
        log::trace!("Skipping directory candidate: {}", canonical.display());
        return Ok(None);
    }

    Ok(Some((requested_path, metadata)))
}
