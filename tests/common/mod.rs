//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

/// Canonical feed URL for index `i`.
pub fn feed_url(i: usize) -> String {
    format!("https://wechat2rss.xlab.app/feed/{i:040x}.xml")
}

pub fn feed_line(i: usize) -> String {
    format!("[Feed {i}]({})", feed_url(i))
}

/// A valid source: `News` holds feeds 0 and 1, `Empty` holds none and the
/// remaining feeds sit under `Tech`.
pub fn valid_source(total: usize) -> String {
    let mut s = String::from("# Feed list\n\n## News\n");
    for i in 0..total.min(2) {
        s.push_str(&feed_line(i));
        s.push('\n');
    }
    s.push_str("## Empty\n\n## Tech\n");
    for i in 2..total {
        s.push_str(&feed_line(i));
        s.push('\n');
    }
    s
}
