use clap::ValueEnum;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::Post;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// The file formats the scraper can persist to.
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    None,
}

impl OutputFormat {
    /// The file extension for this format, if it writes one.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Json => Some("json"),
            OutputFormat::Csv => Some("csv"),
            OutputFormat::None => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Append the format's extension to `base` unless it is already there.
pub fn resolve_output_path(base: &str, format: OutputFormat) -> PathBuf {
    match format.extension() {
        Some(ext) if !base.ends_with(&format!(".{ext}")) => PathBuf::from(format!("{base}.{ext}")),
        _ => PathBuf::from(base),
    }
}

/// Write `posts` to `path` as an indented JSON array.
///
/// Overwrites an existing file. Non-ASCII text is written literally, and an
/// empty input still produces a file holding an empty array.
pub fn save_to_json(posts: &[Post], path: &Path) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    posts.serialize(&mut serializer)?;
    writer.flush()?;
    info!("Data successfully saved to {}", path.display());
    Ok(())
}

/// Write `posts` to `path` as CSV, one row per record.
///
/// The header row comes from the record's field names, in declaration order.
/// An empty input writes nothing and creates no file.
pub fn save_to_csv(posts: &[Post], path: &Path) -> Result<(), OutputError> {
    if posts.is_empty() {
        info!("No data to save to CSV.");
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)?;
    for post in posts {
        writer.serialize(post)?;
    }
    writer.flush()?;
    info!("Data successfully saved to {}", path.display());
    Ok(())
}

/// Run the writer selected by `format` against `base` plus the matching
/// extension. A write failure is logged, not propagated: persisting is the
/// last step and best-effort.
pub fn write_posts(posts: &[Post], format: OutputFormat, base: &str) {
    let path = resolve_output_path(base, format);
    let result = match format {
        OutputFormat::Json => save_to_json(posts, &path),
        OutputFormat::Csv => save_to_csv(posts, &path),
        OutputFormat::None => return,
    };
    if let Err(err) = result {
        error!("Error writing to {}: {err}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_posts() -> Vec<Post> {
        vec![
            Post {
                id: "abc123".to_string(),
                title: "Ünïcödé titles stay literal — 日本語".to_string(),
                score: -4,
                url: "https://example.com/a?x=1".to_string(),
                num_comments: 12,
                created_utc: 1714000000.5,
                selftext: "line one\nline two, with a comma".to_string(),
            },
            Post {
                id: "def456".to_string(),
                title: "plain".to_string(),
                score: 99,
                url: "https://example.com/b".to_string(),
                num_comments: 0,
                created_utc: 1714000101.0,
                selftext: String::new(),
            },
        ]
    }

    #[test]
    fn resolve_output_path_appends_extension_once() {
        assert_eq!(
            resolve_output_path("reddit_posts", OutputFormat::Json),
            PathBuf::from("reddit_posts.json")
        );
        assert_eq!(
            resolve_output_path("reddit_posts.json", OutputFormat::Json),
            PathBuf::from("reddit_posts.json")
        );
        assert_eq!(
            resolve_output_path("dump", OutputFormat::Csv),
            PathBuf::from("dump.csv")
        );
        assert_eq!(
            resolve_output_path("dump", OutputFormat::None),
            PathBuf::from("dump")
        );
    }

    #[test]
    fn json_round_trips_with_unicode_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        let posts = sample_posts();

        save_to_json(&posts, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        // 4-space indentation, non-ASCII written literally rather than \u-escaped
        assert!(raw.contains("\n    {"));
        assert!(raw.contains("日本語"));
        assert!(!raw.contains("\\u"));

        let restored: Vec<Post> = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, posts);
    }

    #[test]
    fn json_empty_input_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");

        save_to_json(&[], &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn csv_round_trips_through_header_aware_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        let posts = sample_posts();

        save_to_csv(&posts, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let header = raw.lines().next().unwrap();
        assert_eq!(header, "id,title,score,url,num_comments,created_utc,selftext");

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let restored: Vec<Post> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(restored, posts);
    }

    #[test]
    fn csv_empty_input_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        save_to_csv(&[], &path).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn write_posts_skips_every_writer_for_none() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out");
        let base = base.to_str().unwrap();

        write_posts(&sample_posts(), OutputFormat::None, base);

        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn write_posts_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "stale").unwrap();

        let base = dir.path().join("out");
        write_posts(&sample_posts(), OutputFormat::Json, base.to_str().unwrap());

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('['));
        assert!(!raw.contains("stale"));
    }
}
