use clap::Parser;
use spaserve::{Ignores, ServeOptions, Single};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long)]
    pub listen_addr: String,

    #[arg(short, long)]
    pub serve_dir: PathBuf,

    /// Skip the startup index and probe the filesystem on every request
    #[arg(long)]
    pub dev: bool,

    #[arg(short, long)]
    pub etag: bool,

    /// Cache lifetime in seconds, or a duration such as `1h`
    #[arg(short, long, value_parser = parse_max_age)]
    pub max_age: Option<u64>,

    #[arg(long)]
    pub immutable: bool,

    /// Serve a fallback document for unmatched paths (default: index)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub single: Option<String>,

    /// Extra paths (regex) that 404 instead of falling back
    #[arg(long)]
    pub ignores: Vec<String>,

    #[arg(long, conflicts_with = "ignores")]
    pub no_ignores: bool,

    #[arg(long, value_delimiter = ',', default_value = "html,htm")]
    pub extensions: Vec<String>,

    #[arg(long)]
    pub dotfiles: bool,

    #[arg(short, long)]
    pub brotli: bool,

    #[arg(short, long)]
    pub gzip: bool,
}

impl Args {
    pub fn to_options(&self) -> ServeOptions {
        let single = match self.single.as_deref() {
            None => Single::Off,
            Some("") => Single::Index,
            Some(doc) => Single::Document(doc.to_string()),
        };
        let ignores = if self.no_ignores {
            Ignores::Disabled
        } else {
            Ignores::Patterns(self.ignores.clone())
        };

        ServeOptions {
            no_cache: self.dev,
            etag: self.etag,
            max_age: self.max_age,
            immutable: self.immutable,
            single,
            ignores,
            extensions: self.extensions.clone(),
            dotfiles: self.dotfiles,
            brotli: self.brotli,
            gzip: self.gzip,
            ..Default::default()
        }
    }
}

fn parse_max_age(value: &str) -> Result<u64, String> {
    if let Ok(seconds) = value.parse::<u64>() {
        return Ok(seconds);
    }
    humantime::parse_duration(value)
        .map(|d: Duration| d.as_secs())
        .map_err(|e| format!("invalid max-age '{}': {}", value, e))
}
