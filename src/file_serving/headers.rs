use mime_guess::{from_path, mime};

use super::FileStats;
use crate::compression::CompressionType;
use crate::http::Headers;

/// Weak validator derived from size and modification time only.
pub fn weak_etag(stats: &FileStats) -> String {
    format!("W/\"{}-{}\"", stats.size, stats.modified_millis())
}

/// Base headers for a file named `name` (URL-relative, variant suffix
/// included). Pre-compressed variants are typed by their original name.
pub fn synthesize(name: &str, stats: &FileStats, want_etag: bool) -> Headers {
    let compression = CompressionType::from_file_name(name);
    let original = name.strip_suffix(compression.extension()).unwrap_or(name);

    let mime_type = from_path(original).first_or_octet_stream();
    let content_type = if mime_type == mime::TEXT_HTML {
        format!("{};charset=utf-8", mime_type)
    } else {
        mime_type.to_string()
    };

    let mut headers = Headers::new();
    headers.set("Content-Length", stats.size.to_string());
    headers.set("Content-Type", content_type);
    headers.set("Last-Modified", httpdate::fmt_http_date(stats.modified));
    if let Some(encoding) = compression.content_encoding() {
        headers.set("Content-Encoding", encoding);
    }
    if want_etag {
        headers.set("ETag", weak_etag(stats));
    }
    headers
}
