#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ByteRange {
    /// Inclusive bounds within the file.
    Satisfiable { start: u64, end: u64 },
    Unsatisfiable,
}

impl ByteRange {
    pub fn content_range(&self, size: u64) -> String {
        match self {
            ByteRange::Satisfiable { start, end } => format!("bytes {}-{}/{}", start, end, size),
            ByteRange::Unsatisfiable => format!("bytes */{}", size),
        }
    }
}

/// Parses a `Range: bytes=start-end` header against a file of `size` bytes.
///
/// A missing start means 0 and a missing or unparsable end means the last
/// byte; the end is clamped to the file. Headers in any other unit are
/// ignored. Only the first range of a multi-range request is honored.
pub fn parse_range(header: &str, size: u64) -> Option<ByteRange> {
    let spec = header.trim().strip_prefix("bytes=")?;
    let first = spec.split(',').next().unwrap_or_default();
    let (start, end) = first.split_once('-').unwrap_or((first, ""));

    let start = start.trim().parse::<u64>().unwrap_or(0);
    if start >= size {
        return Some(ByteRange::Unsatisfiable);
    }

    let last = size - 1;
    let end = end.trim().parse::<u64>().map_or(last, |end| end.min(last));
    if start > end {
        return Some(ByteRange::Unsatisfiable);
    }

    Some(ByteRange::Satisfiable { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_ended_range() {
        assert_eq!(
            parse_range("bytes=0-", 100),
            Some(ByteRange::Satisfiable { start: 0, end: 99 })
        );
        assert_eq!(
            parse_range("bytes=10-", 100),
            Some(ByteRange::Satisfiable { start: 10, end: 99 })
        );
    }

    #[test]
    fn test_bounded_range_is_clamped() {
        assert_eq!(
            parse_range("bytes=5-9", 100),
            Some(ByteRange::Satisfiable { start: 5, end: 9 })
        );
        assert_eq!(
            parse_range("bytes=90-500", 100),
            Some(ByteRange::Satisfiable { start: 90, end: 99 })
        );
    }

    #[test]
    fn test_missing_start_defaults_to_zero() {
        assert_eq!(
            parse_range("bytes=-20", 100),
            Some(ByteRange::Satisfiable { start: 0, end: 20 })
        );
    }

    #[test]
    fn test_unsatisfiable() {
        assert_eq!(parse_range("bytes=100-105", 100), Some(ByteRange::Unsatisfiable));
        assert_eq!(parse_range("bytes=0-", 0), Some(ByteRange::Unsatisfiable));
        assert_eq!(parse_range("bytes=50-10", 100), Some(ByteRange::Unsatisfiable));
    }

    #[test]
    fn test_other_units_ignored() {
        assert_eq!(parse_range("items=0-5", 100), None);
    }

    #[test]
    fn test_content_range() {
        let range = ByteRange::Satisfiable { start: 0, end: 9 };
        assert_eq!(range.content_range(10), "bytes 0-9/10");
        assert_eq!(ByteRange::Unsatisfiable.content_range(10), "bytes */10");
    }
}
