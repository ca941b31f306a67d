use super::app_config::LogLevel;
use crate::domain::entities::ThumbnailQuality;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "thumbloader",
    version,
    about = "Fetch and cache media item thumbnails",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Cache root directory.
    #[arg(long, value_name = "PATH", env = "THUMBLOADER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Write downloaded thumbnails to the disk cache.
    #[arg(long)]
    pub thumbnail_cache: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a thumbnail through the cache.
    Fetch {
        /// Media item id.
        item_id: String,

        /// Thumbnail URL, smallest first. Repeat for more variants.
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,

        /// URL template with a `{size}` placeholder.
        #[arg(long, value_name = "TEMPLATE", conflicts_with = "urls")]
        template: Option<String>,

        /// Requested quality (low, medium, high).
        #[arg(short, long, default_value = "low")]
        quality: ThumbnailQuality,

        /// Ignore an existing disk cache file.
        #[arg(long)]
        no_cache_read: bool,

        /// Do not store the result in any cache.
        #[arg(long)]
        no_cache_write: bool,

        /// Save the decoded thumbnail as PNG here.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Delete every cached thumbnail of an item.
    Invalidate {
        /// Media item id.
        item_id: String,
    },

    /// Print the cache file paths of an item.
    Path {
        /// Media item id.
        item_id: String,

        /// Only print this quality.
        #[arg(short, long)]
        quality: Option<ThumbnailQuality>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let args = CliArgs::parse_from([
            "thumbloader",
            "fetch",
            "abc",
            "--url",
            "http://x/small.png",
            "--url",
            "http://x/large.png",
            "--quality",
            "high",
            "--no-cache-read",
        ]);

        match args.command {
            Command::Fetch {
                item_id,
                urls,
                quality,
                no_cache_read,
                no_cache_write,
                ..
            } => {
                assert_eq!(item_id, "abc");
                assert_eq!(urls.len(), 2);
                assert_eq!(quality, ThumbnailQuality::High);
                assert!(no_cache_read);
                assert!(!no_cache_write);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_url_and_template_conflict() {
        let result = CliArgs::try_parse_from([
            "thumbloader",
            "fetch",
            "abc",
            "--url",
            "http://x/a.png",
            "--template",
            "http://x/{size}.png",
        ]);
        assert!(result.is_err());
    }
}
