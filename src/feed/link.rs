use std::sync::LazyLock;

use regex::Regex;

/// Substring every accepted feed URL must contain.
pub const FEED_HOST_MARKER: &str = "wechat2rss.xlab.app/feed/";

/// Markdown link whose target ends in `.xml`: `[name](url.xml)`.
///
/// Not nesting-aware. The first `]` closes the name and the URL runs up to
/// the first `)`, so lines with brackets or parentheses inside the name or
/// URL are accepted or rejected exactly as this pattern decides.
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+\.xml)\)").expect("valid regex")
});

/// Canonical feed URL: fixed host and path, 40 lowercase hex chars, `.xml`.
static CANONICAL_FEED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://wechat2rss\.xlab\.app/feed/[a-f0-9]{40}\.xml$").expect("valid regex")
});

/// A single subscribable feed: display name plus XML feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feed {
    pub name: String,
    pub url: String,
}

impl Feed {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Returns the first `[name](url.xml)` link in `line`, if any.
///
/// The host marker is not checked here; see [`is_feed_url`].
pub fn find_link(line: &str) -> Option<Feed> {
    LINK_PATTERN
        .captures(line)
        .map(|caps| Feed::new(&caps[1], &caps[2]))
}

/// Returns every non-overlapping `[name](url.xml)` link in `line`, left to right.
pub fn find_links(line: &str) -> impl Iterator<Item = Feed> + '_ {
    LINK_PATTERN
        .captures_iter(line)
        .map(|caps| Feed::new(&caps[1], &caps[2]))
}

/// Cheap pre-filter for a line that is shaped like a single feed link.
///
/// Expects an already trimmed line.
pub fn is_link_line(line: &str) -> bool {
    line.starts_with('[') && line.contains("](") && line.ends_with(".xml)")
}

/// Whether `url` points at the feed host at all.
pub fn is_feed_url(url: &str) -> bool {
    url.contains(FEED_HOST_MARKER)
}

/// Whether `url` has the exact canonical feed URL shape.
pub fn is_canonical_feed_url(url: &str) -> bool {
    CANONICAL_FEED_URL.is_match(url)
}
