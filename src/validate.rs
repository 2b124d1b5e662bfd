//! Pre-conversion checks for a markdown feed list.
//!
//! The validator scans every line for feed links regardless of category
//! context, then applies a fixed sequence of checks. The first failing
//! check decides the outcome.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::config::ValidateOptions;
use crate::feed::{find_links, is_canonical_feed_url, is_feed_url, Feed};

/// Category heading anywhere in the raw content, one per line.
static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## (.+)$").expect("valid regex"));

// ============================================================================
// Error Types
// ============================================================================

/// Reasons a feed list is rejected. The display text is the operator message.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file is empty")]
    EmptyFile,

    /// The file could not be read or is not valid UTF-8.
    #[error("read failure: {0}")]
    Read(std::io::Error),

    #[error("content is empty")]
    BlankContent,

    #[error("no valid XML links found")]
    NoLinks,

    /// Too few links usually means the source was wiped by mistake.
    #[error("link count too low ({found} < {min}), possibly a data-wipe")]
    TooFewLinks { found: usize, min: usize },

    /// Candidate links that do not have the canonical feed URL shape.
    #[error("found malformed links:\n{}", format_malformed(.malformed))]
    MalformedLinks {
        malformed: Vec<LocatedLink>,
        link_count: usize,
    },

    #[error("no category headings found (lines starting with ##)")]
    NoCategories { link_count: usize },
}

impl ValidationError {
    /// Number of valid candidate links known at the point of failure.
    pub fn link_count(&self) -> usize {
        match self {
            Self::TooFewLinks { found, .. } => *found,
            Self::MalformedLinks { link_count, .. } | Self::NoCategories { link_count } => {
                *link_count
            }
            _ => 0,
        }
    }
}

fn format_malformed(links: &[LocatedLink]) -> String {
    links
        .iter()
        .map(|l| format!("line {}: {} -> {}", l.line, l.feed.name, l.feed.url))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Link Scan
// ============================================================================

/// A link found in the source, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLink {
    pub line: usize,
    pub feed: Feed,
}

/// Result of scanning every line of a source for `[name](url.xml)` links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkScan {
    /// Links whose URL carries the feed host marker.
    pub candidates: Vec<LocatedLink>,
    /// Links pointing anywhere else. Reported, never counted.
    pub skipped: Vec<LocatedLink>,
}

/// Collects every link on every line, in document order.
///
/// Unlike the converter, no preceding heading is required.
pub fn scan_links(content: &str) -> LinkScan {
    let mut scan = LinkScan::default();

    for (idx, raw) in content.split('\n').enumerate() {
        let line = idx + 1;
        for feed in find_links(raw.trim()) {
            let located = LocatedLink { line, feed };
            if is_feed_url(&located.feed.url) {
                scan.candidates.push(located);
            } else {
                scan.skipped.push(located);
            }
        }
    }

    scan
}

// ============================================================================
// Validation
// ============================================================================

/// A source that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of `## ` heading lines.
    pub categories: usize,
    /// Number of valid feed links.
    pub link_count: usize,
}

impl ValidationReport {
    pub fn message(&self) -> String {
        format!(
            "validation passed: {} categories, {} links",
            self.categories, self.link_count
        )
    }
}

/// Flattens a validation result into `(ok, message, link_count)`.
pub fn outcome(result: &Result<ValidationReport, ValidationError>) -> (bool, String, usize) {
    match result {
        Ok(report) => (true, report.message(), report.link_count),
        Err(e) => (false, e.to_string(), e.link_count()),
    }
}

/// Validates the markdown feed list at `path`.
///
/// `on_skip` is called once per link that does not point at the feed host,
/// before the outcome is decided.
pub fn validate(
    path: &Path,
    options: &ValidateOptions,
    on_skip: impl FnMut(&LocatedLink),
) -> Result<ValidationReport, ValidationError> {
    if !path.exists() {
        return Err(ValidationError::NotFound(path.to_path_buf()));
    }

    let metadata = std::fs::metadata(path).map_err(ValidationError::Read)?;
    if metadata.len() == 0 {
        return Err(ValidationError::EmptyFile);
    }

    let content = std::fs::read_to_string(path).map_err(ValidationError::Read)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Read feed list");

    validate_content(&content, options, on_skip)
}

/// Validates feed list content already in memory.
///
/// Checks, in order: blank content, no links, too few links, links not in
/// canonical form, no category headings.
pub fn validate_content(
    content: &str,
    options: &ValidateOptions,
    mut on_skip: impl FnMut(&LocatedLink),
) -> Result<ValidationReport, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::BlankContent);
    }

    let scan = scan_links(content);
    for skipped in &scan.skipped {
        tracing::warn!(line = skipped.line, url = %skipped.feed.url, "Link outside feed host");
        on_skip(skipped);
    }

    let link_count = scan.candidates.len();
    if link_count == 0 {
        return Err(ValidationError::NoLinks);
    }
    if link_count < options.min_links {
        return Err(ValidationError::TooFewLinks {
            found: link_count,
            min: options.min_links,
        });
    }

    let malformed: Vec<LocatedLink> = scan
        .candidates
        .into_iter()
        .filter(|l| !is_canonical_feed_url(&l.feed.url))
        .collect();
    if !malformed.is_empty() {
        return Err(ValidationError::MalformedLinks {
            malformed,
            link_count,
        });
    }

    let categories = HEADING_PATTERN.find_iter(content).count();
    if categories == 0 {
        return Err(ValidationError::NoCategories { link_count });
    }

    tracing::info!(categories, links = link_count, "Feed list is valid");
    Ok(ValidationReport {
        categories,
        link_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hex(i: usize) -> String {
        format!("{i:040x}")
    }

    fn feed_line(i: usize) -> String {
        format!("[Feed {i}](https://wechat2rss.xlab.app/feed/{}.xml)", hex(i))
    }

    /// `n` canonical links under a single heading.
    fn source(n: usize) -> String {
        let mut s = String::from("## News\n");
        for i in 0..n {
            s.push_str(&feed_line(i));
            s.push('\n');
        }
        s
    }

    fn check(content: &str) -> Result<ValidationReport, ValidationError> {
        validate_content(content, &ValidateOptions::default(), |_| {})
    }

    #[test]
    fn test_valid_source_passes() {
        let report = check(&source(10)).unwrap();
        assert_eq!(report.categories, 1);
        assert_eq!(report.link_count, 10);
        assert_eq!(report.message(), "validation passed: 1 categories, 10 links");
    }

    #[test]
    fn test_blank_content_rejected() {
        let err = check("  \n\t\n").unwrap_err();
        assert!(matches!(err, ValidationError::BlankContent));
        assert_eq!(err.to_string(), "content is empty");
    }

    #[test]
    fn test_no_links_rejected() {
        let err = check("## News\nnothing here\n").unwrap_err();
        assert!(matches!(err, ValidationError::NoLinks));
        assert_eq!(err.link_count(), 0);
    }

    #[test]
    fn test_too_few_links_rejected() {
        for n in 1..10 {
            let err = check(&source(n)).unwrap_err();
            assert!(matches!(err, ValidationError::TooFewLinks { found, min: 10 } if found == n));
            assert_eq!(err.link_count(), n);
        }

        let err = check(&source(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "link count too low (3 < 10), possibly a data-wipe"
        );
    }

    #[test]
    fn test_min_links_option() {
        let options = ValidateOptions { min_links: 2 };
        let report = validate_content(&source(2), &options, |_| {}).unwrap();
        assert_eq!(report.link_count, 2);
    }

    #[test]
    fn test_malformed_links_listed_with_line_numbers() {
        let mut content = source(10);
        content.push_str("[Short](https://wechat2rss.xlab.app/feed/abc.xml)\n");
        content.push_str("[Upper](https://wechat2rss.xlab.app/feed/ABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD.xml)\n");

        let err = check(&content).unwrap_err();
        assert_eq!(err.link_count(), 12);
        assert_eq!(
            err.to_string(),
            "found malformed links:\n\
             line 12: Short -> https://wechat2rss.xlab.app/feed/abc.xml\n\
             line 13: Upper -> https://wechat2rss.xlab.app/feed/ABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD.xml"
        );
    }

    #[test]
    fn test_no_headings_rejected() {
        let content: String = (0..10).map(|i| feed_line(i) + "\n").collect();
        let err = check(&content).unwrap_err();
        assert!(matches!(err, ValidationError::NoCategories { link_count: 10 }));
    }

    #[test]
    fn test_indented_heading_not_counted() {
        let content = source(10).replacen("## News", "  ## News", 1);
        let err = check(&content).unwrap_err();
        assert!(matches!(err, ValidationError::NoCategories { .. }));
    }

    #[test]
    fn test_headings_counted_per_line() {
        let mut content = source(10);
        content.push_str("## Empty\n## News\n");
        let report = check(&content).unwrap();
        assert_eq!(report.categories, 3);
    }

    #[test]
    fn test_links_counted_without_heading_context() {
        let mut content: String = (0..10).map(|i| feed_line(i) + "\n").collect();
        content.push_str("## Late\n");
        let report = check(&content).unwrap();
        assert_eq!(report.link_count, 10);
    }

    #[test]
    fn test_non_feed_links_reported_and_excluded() {
        let mut content = source(10);
        content.push_str("[Other](https://example.com/rss.xml)\n");

        let mut skipped = Vec::new();
        let report = validate_content(&content, &ValidateOptions::default(), |l| {
            skipped.push(l.clone())
        })
        .unwrap();

        assert_eq!(report.link_count, 10);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 12);
        assert_eq!(skipped[0].feed.url, "https://example.com/rss.xml");
    }

    #[test]
    fn test_skip_callback_runs_even_when_validation_fails() {
        let content = "## News\n[Other](https://example.com/rss.xml)\n";
        let mut calls = 0;
        let result = validate_content(content, &ValidateOptions::default(), |_| calls += 1);
        assert!(matches!(result, Err(ValidationError::NoLinks)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_scan_finds_multiple_links_per_line() {
        let line = format!("{} {}", feed_line(1), feed_line(2));
        let scan = scan_links(&line);
        assert_eq!(scan.candidates.len(), 2);
        assert!(scan.candidates.iter().all(|l| l.line == 1));
    }

    #[test]
    fn test_outcome_triple() {
        assert_eq!(
            outcome(&check(&source(10))),
            (true, "validation passed: 1 categories, 10 links".to_string(), 10)
        );
        assert_eq!(
            outcome(&check(&source(4))),
            (
                false,
                "link count too low (4 < 10), possibly a data-wipe".to_string(),
                4
            )
        );
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");
        let err = validate(&path, &ValidateOptions::default(), |_| {}).unwrap_err();
        assert!(matches!(err, ValidationError::NotFound(_)));
        assert!(err.to_string().starts_with("file not found: "));
    }

    #[test]
    fn test_validate_zero_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        std::fs::write(&path, "").unwrap();
        let err = validate(&path, &ValidateOptions::default(), |_| {}).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyFile));
    }

    #[test]
    fn test_validate_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = validate(&path, &ValidateOptions::default(), |_| {}).unwrap_err();
        assert!(matches!(err, ValidationError::Read(_)));
        assert!(err.to_string().starts_with("read failure: "));
    }

    #[test]
    fn test_validate_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.md");
        std::fs::write(&path, source(12)).unwrap();
        let report = validate(&path, &ValidateOptions::default(), |_| {}).unwrap();
        assert_eq!(report.link_count, 12);
    }
}
