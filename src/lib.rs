//! Static asset serving engine.
//!
//! A [`StaticServer`] resolves already-parsed requests against a root
//! directory (extension, directory-index and single-page fallbacks), picks
//! pre-compressed variants, and answers conditional and range requests. The
//! transport that delivers the [`Response`] is left to the caller.

pub mod compression;
pub mod error;
pub mod file_serving;
pub mod http;
pub mod logging;
pub mod options;

pub use error::ServeError;
pub use file_serving::handlers::StaticServer;
pub use file_serving::{FileEntry, FileStats};
pub use http::{Body, FileBody, Headers, Request, Response};
pub use options::{Ignores, ServeOptions, Single};
