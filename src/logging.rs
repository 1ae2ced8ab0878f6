use env_logger::Builder;
use log::{Level, LevelFilter};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

/// Installs the global logger. Info by default, `RUST_LOG` overrides.
pub fn setup_logging() {
    let colored = atty::is(atty::Stream::Stderr);
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .format(move |buf, record| {
            let location = (record.level() >= Level::Debug).then(|| {
                (record.file().unwrap_or("unknown"), record.line().unwrap_or(0))
            });
            let line = format_line(
                record.level(),
                SystemTime::now(),
                record.args(),
                location,
                colored,
            );
            writeln!(buf, "{}", line)
        })
        .init();
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1B[31m",
        Level::Warn => "\x1B[33m",
        Level::Info => "\x1B[32m",
        Level::Debug => "\x1B[36m",
        Level::Trace => "\x1B[35m",
    }
}

/// One log line: level, RFC 3339 timestamp, message, and for debug/trace
/// records the source location.
fn format_line(
    level: Level,
    timestamp: SystemTime,
    message: &dyn fmt::Display,
    location: Option<(&str, u32)>,
    colored: bool,
) -> String {
    let level = if colored {
        format!("{}{:>5}\x1B[0m", level_color(level), level)
    } else {
        format!("{:>5}", level)
    };
    let mut line = format!(
        "{} [{}] {}",
        level,
        humantime::format_rfc3339_millis(timestamp),
        message
    );
    if let Some((file, number)) = location {
        line.push_str(&format!(" - {}:{}", file, number));
    }
    line
}

#[macro_export]
macro_rules! log_request {
    ($method:expr, $path:expr) => {
        log::info!("→ {} {}", $method, $path)
    };
}

#[macro_export]
macro_rules! log_response {
    ($status:expr, $duration:expr, $body_size:expr) => {
        log::info!("← {} ({:?}) - Size: {}", $status, $duration, $body_size)
    };
}

#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {
        log::error!("❌ {} - {}", $context, $error)
    };
}

/// Types that can describe themselves in a log line.
pub trait Loggable {
    fn log_description(&self) -> String;
}

impl<T: std::fmt::Display> Loggable for T {
    fn log_description(&self) -> String {
        self.to_string()
    }
}

// Path has no Display impl
impl Loggable for Path {
    fn log_description(&self) -> String {
        self.display().to_string()
    }
}

/// Wraps a fallible operation with start/complete/failed log lines.
pub trait LoggingExt: Loggable {
    fn log_operation<F, T, E>(&self, operation: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::fmt::Display;
}

impl<S: ?Sized + Loggable> LoggingExt for S {
    fn log_operation<F, T, E>(&self, operation: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::fmt::Display,
    {
        log::debug!("Starting {} on {}", operation, self.log_description());
        match f() {
            Ok(result) => {
                log::debug!("Completed {} on {}", operation, self.log_description());
                Ok(result)
            }
            Err(e) => {
                log::error!("Failed {} on {}: {}", operation, self.log_description(), e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_plain() {
        let timestamp = SystemTime::UNIX_EPOCH;
        let line = format_line(Level::Info, timestamp, &"Indexed 3 files", None, false);
        assert_eq!(line, " INFO [1970-01-01T00:00:00.000Z] Indexed 3 files");
    }

    #[test]
    fn test_format_line_with_location_and_color() {
        let timestamp = SystemTime::UNIX_EPOCH;
        let line = format_line(
            Level::Debug,
            timestamp,
            &"Index hit",
            Some(("src/file_serving/resolver.rs", 37)),
            true,
        );
        assert_eq!(
            line,
            "\x1B[36mDEBUG\x1B[0m [1970-01-01T00:00:00.000Z] Index hit - src/file_serving/resolver.rs:37"
        );
    }

    #[test]
    fn test_path_description() {
        let path = Path::new("/srv/www/index.html");
        assert_eq!(path.log_description(), "/srv/www/index.html");
    }

    #[test]
    fn test_log_operation_passes_result_through() {
        let target = String::from("/index.html");
        let ok: Result<u32, String> = target.log_operation("stat", || Ok(7));
        assert_eq!(ok, Ok(7));

        let err: Result<u32, String> = target.log_operation("stat", || Err("gone".to_string()));
        assert_eq!(err, Err("gone".to_string()));
    }
}
