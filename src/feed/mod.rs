//! Feed list handling: markdown grammar, category grouping and OPML output.
//!
//! - [`link`] - The `[name](url.xml)` link grammar and feed URL checks
//! - [`parser`] - Markdown feed list to ordered categories
//! - [`opml`] - OPML 1.0 export (atomic file write) and read-back
//!
//! # Example
//!
//! ```
//! use feedmark::feed::{export_opml, parse_markdown};
//!
//! let md = "## News\n[Feed](https://wechat2rss.xlab.app/feed/0000000000000000000000000000000000000000.xml)\n";
//! let list = parse_markdown(md);
//! assert_eq!(list.total_feeds(), 1);
//!
//! let opml = export_opml(&list, "My Feeds").unwrap();
//! assert!(opml.contains(r#"<outline text="News" title="News">"#));
//! ```

mod link;
mod opml;
mod parser;

pub use link::{
    find_link, find_links, is_canonical_feed_url, is_feed_url, is_link_line, Feed,
    FEED_HOST_MARKER,
};
pub use opml::{
    export_opml, export_to_file, parse_opml_content, read_opml_file, OpmlError, OpmlFeed,
    XML_DECLARATION,
};
pub use parser::{parse_markdown, Category, FeedList};
