//! Markdown feed list to OPML conversion.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConvertOptions;
use crate::feed::{
    export_to_file, is_feed_url, parse_markdown, read_opml_file, FeedList, OpmlError,
};

/// Errors that end a conversion run. The display text is the operator message.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other failure reading the input, including invalid UTF-8.
    #[error("read failure: {0}")]
    Read(std::io::Error),

    /// The input parsed but yielded no feeds. No output is written.
    #[error("no valid feed links found")]
    NoFeeds { categories: usize },

    #[error("failed to write {}: {error:#}", .path.display())]
    Write { path: PathBuf, error: anyhow::Error },

    /// The written file does not read back with the expected feeds.
    #[error("OPML verification failed for {}: {reason}", .path.display())]
    Verify { path: PathBuf, reason: String },
}

/// What a successful conversion wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Number of distinct categories in the source, empty ones included.
    pub category_count: usize,
    pub total_feeds: usize,
    /// `(name, feed count)` for each category written, in source order.
    pub categories: Vec<(String, usize)>,
}

impl ConversionSummary {
    fn from_list(list: &FeedList) -> Self {
        Self {
            category_count: list.len(),
            total_feeds: list.total_feeds(),
            categories: list
                .non_empty()
                .map(|c| (c.name.clone(), c.feeds.len()))
                .collect(),
        }
    }
}

/// Reads and parses the markdown feed list at `path`.
pub fn parse_file(path: &Path) -> Result<FeedList, ConvertError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConvertError::NotFound(path.to_path_buf()),
        _ => ConvertError::Read(e),
    })?;
    Ok(parse_markdown(&content))
}

/// Converts the markdown feed list at `input` into an OPML file at `output`.
///
/// Fails without touching `output` when the input holds no feeds. After the
/// write, the file is read back and its feed count compared with the source,
/// counting outlines by the same `.xml` suffix and host marker rule the
/// markdown parser applies.
pub fn convert(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<ConversionSummary, ConvertError> {
    let list = parse_file(input)?;
    let summary = ConversionSummary::from_list(&list);
    tracing::info!(
        input = %input.display(),
        categories = summary.category_count,
        feeds = summary.total_feeds,
        "Parsed feed list"
    );

    if summary.total_feeds == 0 {
        return Err(ConvertError::NoFeeds {
            categories: summary.category_count,
        });
    }

    export_to_file(&list, &options.title, output).map_err(|error| ConvertError::Write {
        path: output.to_path_buf(),
        error,
    })?;

    verify_output(output, summary.total_feeds)?;
    tracing::info!(output = %output.display(), "Wrote OPML");

    Ok(summary)
}

fn verify_output(path: &Path, expected: usize) -> Result<(), ConvertError> {
    let verify_err = |reason: String| ConvertError::Verify {
        path: path.to_path_buf(),
        reason,
    };

    let feeds = read_opml_file(path).map_err(|e: OpmlError| verify_err(e.to_string()))?;
    let found = feeds
        .iter()
        .filter(|f| f.xml_url.ends_with(".xml") && is_feed_url(&f.xml_url))
        .count();
    if found != expected {
        return Err(verify_err(format!(
            "expected {expected} feeds, read back {found}"
        )));
    }
    tracing::debug!(path = %path.display(), feeds = expected, "Verified OPML output");
    Ok(())
}
