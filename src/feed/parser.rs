use super::link::{find_link, is_feed_url, is_link_line, Feed};

/// Marker that opens a category heading line.
const HEADING_PREFIX: &str = "## ";

/// A named group of feeds, one per `## ` heading in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub feeds: Vec<Feed>,
}

/// Categories in order of first appearance.
///
/// A heading that repeats an earlier name reopens that category, so its
/// later feeds are appended to the existing entry instead of creating a
/// second one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedList {
    categories: Vec<Category>,
}

impl FeedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the category named `name`, creating it if needed.
    fn open_category(&mut self, name: &str) -> usize {
        if let Some(idx) = self.categories.iter().position(|c| c.name == name) {
            return idx;
        }
        self.categories.push(Category {
            name: name.to_owned(),
            feeds: Vec::new(),
        });
        self.categories.len() - 1
    }

    /// All categories, including empty ones.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Categories that own at least one feed.
    pub fn non_empty(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| !c.feeds.is_empty())
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn total_feeds(&self) -> usize {
        self.categories.iter().map(|c| c.feeds.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

/// Parses a markdown feed list into categories.
///
/// Each line is trimmed, then classified:
///
/// - `## <name>` opens (or reopens) category `<name>`.
/// - A line starting with `[`, containing `](` and ending in `.xml)` is a
///   feed link. Its first `[name](url.xml)` match is added to the current
///   category when the URL carries the feed host marker.
/// - Anything else is ignored.
///
/// Heading classification wins over link classification. Links seen before
/// the first heading have no owning category and are dropped.
pub fn parse_markdown(content: &str) -> FeedList {
    let mut list = FeedList::new();
    let mut current: Option<usize> = None;

    for (idx, raw) in content.split('\n').enumerate() {
        let line = raw.trim();

        if let Some(rest) = line.strip_prefix(HEADING_PREFIX) {
            let name = rest.trim();
            current = Some(list.open_category(name));
            continue;
        }

        let Some(cat_idx) = current else {
            continue;
        };
        if !is_link_line(line) {
            continue;
        }

        match find_link(line) {
            Some(feed) if is_feed_url(&feed.url) => {
                list.categories[cat_idx].feeds.push(feed);
            }
            Some(feed) => {
                tracing::debug!(line = idx + 1, url = %feed.url, "Skipping link outside feed host");
            }
            None => {}
        }
    }

    list
}
