#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CompressionType {
    Brotli,
    Gzip,
    None,
}

impl CompressionType {
    /// File-name suffix of a pre-compressed variant.
    pub fn extension(self) -> &'static str {
        match self {
            CompressionType::Brotli => ".br",
            CompressionType::Gzip => ".gz",
            CompressionType::None => "",
        }
    }

    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            CompressionType::Brotli => Some("br"),
            CompressionType::Gzip => Some("gzip"),
            CompressionType::None => None,
        }
    }

    pub fn from_file_name(name: &str) -> CompressionType {
        [CompressionType::Brotli, CompressionType::Gzip]
            .into_iter()
            .find(|c| name.ends_with(c.extension()))
            .unwrap_or(CompressionType::None)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct AcceptedCompression {
    pub supports_brotli: bool,
    pub supports_gzip: bool,
}

pub fn determine_compression(accept_encoding: &str) -> AcceptedCompression {
    let binding = accept_encoding.to_lowercase();
    let encodings: Vec<&str> = binding
        .split(',')
        .filter_map(|s| {
            let mut parts = s.split(';').map(str::trim);
            let name = parts.next()?;
            let refused = parts.any(|p| {
                p.strip_prefix("q=")
                    .and_then(|q| q.parse::<f32>().ok())
                    .is_some_and(|q| q == 0.0)
            });
            (!name.is_empty() && !refused).then_some(name)
        })
        .collect();

    AcceptedCompression {
        supports_brotli: encodings.iter().any(|&e| e == "br" || e == "brotli"),
        supports_gzip: encodings.iter().any(|&e| e == "gzip"),
    }
}

/// Dotted suffix for a configured extension; the empty extension stays empty.
fn dotted(ext: &str) -> String {
    if ext.is_empty() {
        String::new()
    } else {
        format!(".{}", ext.trim_start_matches('.'))
    }
}

fn variants(extensions: &[String], compression: CompressionType) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| format!("{}{}", dotted(ext), compression.extension()))
        .chain(std::iter::once(compression.extension().to_string()))
        .collect()
}

/// Builds the ordered suffix list tried for every request path.
///
/// Precedence is brotli variants, then gzip variants, then the path as
/// requested, then each configured extension in turn.
pub fn negotiate(
    extensions: &[String],
    accept_encoding: &str,
    gzip: bool,
    brotli: bool,
) -> Vec<String> {
    let accepted = determine_compression(accept_encoding);
    let mut suffixes = Vec::new();

    if brotli && accepted.supports_brotli {
        suffixes.extend(variants(extensions, CompressionType::Brotli));
    }
    if gzip && accepted.supports_gzip {
        suffixes.extend(variants(extensions, CompressionType::Gzip));
    }

    suffixes.push(String::new());
    suffixes.extend(extensions.iter().map(|ext| dotted(ext)));

    log::trace!(
        "Negotiated suffixes for accept-encoding '{}': {:?}",
        accept_encoding,
        suffixes
    );
    suffixes
}
