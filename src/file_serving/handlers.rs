use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use super::index::Index;
use super::path_utils::decode_request_path;
use super::range::{parse_range, ByteRange};
use super::resolver::{IndexedResolver, LiveResolver, Resolver};
use super::spa::IgnoreMatcher;
use super::FileEntry;
use crate::compression::negotiate;
use crate::error::ServeError;
use crate::http::{Body, FileBody, Headers, Request, Response};
use crate::options::ServeOptions;

/// Resolves requests against a served root and builds responses.
///
/// Construction does all fallible work up front; [`StaticServer::handle`]
/// never fails and is safe to call from any number of threads at once.
pub struct StaticServer {
    resolver: Box<dyn Resolver>,
    ignores: IgnoreMatcher,
    fallback: String,
    options: ServeOptions,
}

impl fmt::Debug for StaticServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticServer")
            .field("root", &self.resolver.root())
            .field("fallback", &self.fallback)
            .field("options", &self.options)
            .finish()
    }
}

impl StaticServer {
    pub fn new(root: impl AsRef<Path>, options: ServeOptions) -> Result<Self, ServeError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ServeError::MissingRoot(root.to_path_buf()));
        }

        let resolver: Box<dyn Resolver> = if options.no_cache {
            log::info!("Serving {} without an index", root.display());
            Box::new(LiveResolver::new(root, &options)?)
        } else {
            let index = Index::build(root, &options)?;
            if index.is_empty() {
                log::warn!("No servable files under {}", root.display());
            }
            Box::new(IndexedResolver::new(index))
        };

        Ok(Self {
            resolver,
            ignores: IgnoreMatcher::new(&options)?,
            fallback: options.fallback_path(),
            options,
        })
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn options(&self) -> &ServeOptions {
        &self.options
    }

    /// Finds the entry for `request`, applying the SPA fallback when
    /// configured. Returns the decoded request path alongside the entry.
    pub fn resolve(&self, request: &Request) -> (String, Option<Cow<'_, FileEntry>>) {
        let pathname = decode_request_path(&request.path);
        let suffixes = negotiate(
            &self.options.extensions,
            request.header("accept-encoding").unwrap_or(""),
            self.options.gzip,
            self.options.brotli,
        );

        let entry = self.resolver.resolve(&pathname, &suffixes).or_else(|| {
            if self.options.is_spa() && !self.ignores.is_ignored(&pathname) {
                log::debug!("No match for {}, trying fallback {}", pathname, self.fallback);
                self.resolver.resolve(&self.fallback, &suffixes)
            } else {
                None
            }
        });

        (pathname, entry)
    }

    pub fn handle(&self, request: &Request) -> Response {
        let (pathname, entry) = self.resolve(request);

        let mut response = match &entry {
            Some(entry) => self.respond(request, &**entry),
            None => {
                log::debug!("Not found: {}", pathname);
                match &self.options.on_no_match {
                    Some(on_no_match) => on_no_match(request),
                    None => Response::not_found(),
                }
            }
        };

        if self.options.negotiates_encoding() {
            response.headers.set("Vary", "Accept-Encoding");
        }

        if let (Some(entry), Some(set_headers)) = (&entry, &self.options.set_headers) {
            response
                .headers
                .merge(set_headers(request, &pathname, &**entry));
        }

        response
    }

    fn respond(&self, request: &Request, entry: &FileEntry) -> Response {
        // Work on a copy; the entry's headers are shared between requests.
        let mut headers = entry.headers.clone();

        if self.options.etag {
            let etag = entry.headers.get("ETag");
            if etag.is_some() && request.header("if-none-match") == etag {
                log::debug!("ETag match for {}", entry.abs_path.display());
                return Response {
                    status: 304,
                    headers,
                    body: Body::Empty,
                };
            }
        }

        let size = entry.stats.size;
        let range = request
            .header("range")
            .and_then(|header| parse_range(header, size));

        match range {
            Some(ByteRange::Unsatisfiable) => {
                log::debug!(
                    "Unsatisfiable range for {} ({} bytes)",
                    entry.abs_path.display(),
                    size
                );
                let mut headers = Headers::new();
                headers.set("Content-Range", ByteRange::Unsatisfiable.content_range(size));
                Response {
                    status: 416,
                    headers,
                    body: Body::Empty,
                }
            }
            Some(range @ ByteRange::Satisfiable { start, end }) => {
                let len = end - start + 1;
                headers.set("Content-Range", range.content_range(size));
                headers.set("Content-Length", len.to_string());
                headers.set("Accept-Ranges", "bytes");
                Response {
                    status: 206,
                    headers,
                    body: Body::File(FileBody {
                        path: entry.abs_path.clone(),
                        offset: start,
                        len,
                    }),
                }
            }
            None => Response {
                status: 200,
                headers,
                body: Body::File(FileBody {
                    path: entry.abs_path.clone(),
                    offset: 0,
                    len: size,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(temp.path().join("data.txt"), "0123456789").unwrap();
        temp
    }

    #[test]
    fn test_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let result = StaticServer::new(temp.path().join("nope"), ServeOptions::default());
        assert!(matches!(result, Err(ServeError::MissingRoot(_))));
    }

    #[test]
    fn test_plain_200() {
        let temp = site();
        let server = StaticServer::new(temp.path(), ServeOptions::default()).unwrap();
        let response = server.handle(&Request::get("/data.txt"));

        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("Content-Length"), Some("10"));
        assert_eq!(response.headers.get("Content-Type"), Some("text/plain"));
        assert!(!response.headers.contains("Vary"));
        match response.body {
            Body::File(body) => assert_eq!(body.read_all().unwrap(), b"0123456789"),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_404_default_body() {
        let temp = site();
        let server = StaticServer::new(temp.path(), ServeOptions::default()).unwrap();
        let response = server.handle(&Request::get("/nope"));

        assert_eq!(response.status, 404);
        assert_eq!(response.body, Body::Bytes(b"Not Found".to_vec()));
    }

    #[test]
    fn test_range_does_not_touch_stored_headers() {
        let temp = site();
        let server = StaticServer::new(temp.path(), ServeOptions::default()).unwrap();

        let partial = server.handle(&Request::get("/data.txt").with_header("Range", "bytes=2-4"));
        assert_eq!(partial.status, 206);
        assert_eq!(partial.headers.get("Content-Length"), Some("3"));

        let full = server.handle(&Request::get("/data.txt"));
        assert_eq!(full.status, 200);
        assert_eq!(full.headers.get("Content-Length"), Some("10"));
        assert!(!full.headers.contains("Content-Range"));
    }

    #[test]
    fn test_vary_set_when_negotiating() {
        let temp = site();
        let options = ServeOptions {
            gzip: true,
            ..Default::default()
        };
        let server = StaticServer::new(temp.path(), options).unwrap();

        let found = server.handle(&Request::get("/data.txt"));
        assert_eq!(found.headers.get("Vary"), Some("Accept-Encoding"));

        let missing = server.handle(&Request::get("/nope"));
        assert_eq!(missing.headers.get("Vary"), Some("Accept-Encoding"));
    }
}
