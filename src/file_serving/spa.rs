use regex::{Regex, RegexBuilder};

use crate::error::ServeError;
use crate::options::{Ignores, ServeOptions};

/// Any final segment that looks like `name.ext`.
const ASSET_PATTERN: &str = r"/([A-Za-z\s\d~$._-]+\.\w+)+$";
const DOTFILE_PATTERN: &str = r"/\.\w";
const WELL_KNOWN_PATTERN: &str = r"/\.well-known";

/// Decides which unmatched paths are exempt from SPA fallback and should
/// 404 instead. Never consulted for direct asset resolution.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<Regex>,
}

impl IgnoreMatcher {
    pub fn new(options: &ServeOptions) -> Result<Self, ServeError> {
        let extra = match &options.ignores {
            Ignores::Disabled => return Ok(Self::default()),
            Ignores::Patterns(extra) => extra,
        };

        let hidden = if options.dotfiles {
            WELL_KNOWN_PATTERN
        } else {
            DOTFILE_PATTERN
        };

        let mut patterns = vec![compile(ASSET_PATTERN, false)?, compile(hidden, false)?];
        for pattern in extra {
            patterns.push(compile(pattern, true)?);
        }
        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        let matched = self.patterns.iter().find(|p| p.is_match(path));
        if let Some(pattern) = matched {
            log::debug!("Path '{}' matches ignore pattern {}", path, pattern);
        }
        matched.is_some()
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, ServeError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ServeError::IgnorePattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(options: ServeOptions) -> IgnoreMatcher {
        IgnoreMatcher::new(&options).unwrap()
    }

    #[test]
    fn test_asset_shaped_paths_are_ignored() {
        let matcher = build(ServeOptions::default());
        assert!(matcher.is_ignored("/assets/missing.js"));
        assert!(matcher.is_ignored("/favicon.ico"));
        assert!(matcher.is_ignored("/bundle.min.css"));
        assert!(!matcher.is_ignored("/app/unknown-route"));
        assert!(!matcher.is_ignored("/"));
    }

    #[test]
    fn test_hidden_segments() {
        let matcher = build(ServeOptions::default());
        assert!(matcher.is_ignored("/.hidden/route"));
        assert!(matcher.is_ignored("/.well-known/thing"));

        let matcher = build(ServeOptions {
            dotfiles: true,
            ..Default::default()
        });
        assert!(!matcher.is_ignored("/.hidden/route"));
        assert!(matcher.is_ignored("/.well-known/thing"));
    }

    #[test]
    fn test_extra_patterns_are_case_insensitive() {
        let matcher = build(ServeOptions {
            ignores: Ignores::Patterns(vec!["^/api/".to_string()]),
            ..Default::default()
        });
        assert!(matcher.is_ignored("/API/users"));
        assert!(!matcher.is_ignored("/dashboard/users"));
    }

    #[test]
    fn test_disabled_ignores_nothing() {
        let matcher = build(ServeOptions {
            ignores: Ignores::Disabled,
            ..Default::default()
        });
        assert!(!matcher.is_ignored("/assets/missing.js"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = IgnoreMatcher::new(&ServeOptions {
            ignores: Ignores::Patterns(vec!["(unclosed".to_string()]),
            ..Default::default()
        });
        assert!(matches!(result, Err(ServeError::IgnorePattern { .. })));
    }
}
