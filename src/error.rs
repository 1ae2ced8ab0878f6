use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that prevent an engine from being constructed.
///
/// Request handling itself never fails: unresolvable paths and bad ranges
/// are ordinary responses.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Serve directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to index {}: {source}", .path.display())]
    IndexBuild {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServeError::MissingRoot(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Serve directory not found: /no/such/dir");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ServeError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.to_string().contains("denied"));
    }
}
