use std::fmt;
use std::sync::Arc;

use crate::file_serving::FileEntry;
use crate::http::{Headers, Request, Response};

/// Custom responder used when nothing (not even the SPA fallback) matched.
pub type NotFoundHandler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Final header hook: receives the request, the matched path and the
/// resolved entry, and returns headers merged on top of the computed ones.
pub type HeaderHook = Arc<dyn Fn(&Request, &str, &FileEntry) -> Headers + Send + Sync>;

/// Single-page-application fallback mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Single {
    #[default]
    Off,
    /// Fall back to the root index document.
    Index,
    /// Fall back to the given document, e.g. `200.html`.
    Document(String),
}

/// Paths exempt from SPA fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignores {
    /// No path is exempt; every unmatched path falls back.
    Disabled,
    /// Built-in rules plus these extra case-insensitive regexes.
    Patterns(Vec<String>),
}

impl Default for Ignores {
    fn default() -> Self {
        Ignores::Patterns(Vec::new())
    }
}

#[derive(Clone)]
pub struct ServeOptions {
    pub no_cache: bool,
    pub etag: bool,
    pub max_age: Option<u64>,
    pub immutable: bool,
    pub single: Single,
    pub ignores: Ignores,
    pub extensions: Vec<String>,
    pub dotfiles: bool,
    pub brotli: bool,
    pub gzip: bool,
    pub on_no_match: Option<NotFoundHandler>,
    pub set_headers: Option<HeaderHook>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            no_cache: false,
            etag: false,
            max_age: None,
            immutable: false,
            single: Single::Off,
            ignores: Ignores::default(),
            extensions: vec!["html".to_string(), "htm".to_string()],
            dotfiles: false,
            brotli: false,
            gzip: false,
            on_no_match: None,
            set_headers: None,
        }
    }
}

impl fmt::Debug for ServeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeOptions")
            .field("no_cache", &self.no_cache)
            .field("etag", &self.etag)
            .field("max_age", &self.max_age)
            .field("immutable", &self.immutable)
            .field("single", &self.single)
            .field("ignores", &self.ignores)
            .field("extensions", &self.extensions)
            .field("dotfiles", &self.dotfiles)
            .field("brotli", &self.brotli)
            .field("gzip", &self.gzip)
            .field("on_no_match", &self.on_no_match.is_some())
            .field("set_headers", &self.set_headers.is_some())
            .finish()
    }
}

impl ServeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache-Control applied to indexed entries.
    pub fn cache_control(&self) -> String {
        match self.max_age {
            Some(max_age) => {
                let mut cc = format!("public,max-age={}", max_age);
                if self.immutable {
                    cc.push_str(",immutable");
                } else if max_age == 0 {
                    cc.push_str(",must-revalidate");
                }
                cc
            }
            None => self.revalidate_cache_control().to_string(),
        }
    }

    /// Cache-Control for entries that must always be revalidated.
    pub fn revalidate_cache_control(&self) -> &'static str {
        if self.etag {
            "no-cache"
        } else {
            "no-store"
        }
    }

    pub fn is_spa(&self) -> bool {
        self.single != Single::Off
    }

    /// Base path re-resolved when SPA fallback kicks in.
    pub fn fallback_path(&self) -> String {
        match &self.single {
            Single::Off | Single::Index => "/".to_string(),
            Single::Document(doc) => {
                let doc = doc.trim_start_matches('/');
                let stem = match doc.rfind('.') {
                    Some(idx) => &doc[..idx],
                    None => doc,
                };
                format!("/{}", stem)
            }
        }
    }

    /// Whether any compressed-variant negotiation is configured.
    pub fn negotiates_encoding(&self) -> bool {
        self.brotli || self.gzip
    }
}
