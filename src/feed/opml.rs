use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use super::parser::FeedList;
use crate::config::OPML_INDENT;

/// XML declaration written as the first line of every generated document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// SEC-003: Maximum allowed nesting depth for OPML outline elements.
/// Prevents stack overflow attacks from maliciously crafted deeply nested OPMLs.
const MAX_OPML_DEPTH: usize = 50;

/// Errors that can occur while reading an OPML document back.
#[derive(Debug, Error)]
pub enum OpmlError {
    /// SEC-003: OPML nesting depth exceeds safety limit.
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// File I/O error.
    #[error("Failed to read OPML file: {0}")]
    Io(#[from] std::io::Error),
}

/// A feed outline read back from an OPML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpmlFeed {
    /// Text of the nearest enclosing outline without `xmlUrl`, if any.
    pub category: Option<String>,
    /// Sourced from `title`, falling back to `text`, then to the XML URL.
    pub title: String,
    pub xml_url: String,
    pub html_url: Option<String>,
}

/// Renders `list` as an OPML 1.0 document.
///
/// Layout:
///
/// ```text
/// <?xml version="1.0" encoding="UTF-8"?>
/// <opml version="1.0">
///     <head>
///         <title>{title}</title>
///     </head>
///     <body>
///         <outline text="{category}" title="{category}">
///             <outline text="{name}" title="{name}" type="rss" xmlUrl="{url}" htmlUrl="{url}"/>
///         </outline>
///     </body>
/// </opml>
/// ```
///
/// Categories without feeds get no outline. The declaration is emitted once,
/// by hand, ahead of the tree; the XML writer never writes one itself.
pub fn export_opml(list: &FeedList, title: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', OPML_INDENT);

    // <opml version="1.0">
    let mut opml = BytesStart::new("opml");
    opml.push_attribute(("version", "1.0"));
    writer
        .write_event(Event::Start(opml))
        .context("Failed to write opml element")?;

    // <head><title>...</title></head>
    writer
        .write_event(Event::Start(BytesStart::new("head")))
        .context("Failed to write head element")?;
    writer
        .write_event(Event::Start(BytesStart::new("title")))
        .context("Failed to write title element")?;
    writer
        .write_event(Event::Text(BytesText::new(title)))
        .context("Failed to write title text")?;
    writer
        .write_event(Event::End(BytesEnd::new("title")))
        .context("Failed to write title end")?;
    writer
        .write_event(Event::End(BytesEnd::new("head")))
        .context("Failed to write head end")?;

    // <body>
    writer
        .write_event(Event::Start(BytesStart::new("body")))
        .context("Failed to write body element")?;

    for category in list.non_empty() {
        let mut group = BytesStart::new("outline");
        group.push_attribute(("text", category.name.as_str()));
        group.push_attribute(("title", category.name.as_str()));
        writer
            .write_event(Event::Start(group))
            .with_context(|| format!("Failed to write category outline '{}'", category.name))?;

        for feed in &category.feeds {
            let mut outline = BytesStart::new("outline");
            outline.push_attribute(("text", feed.name.as_str()));
            outline.push_attribute(("title", feed.name.as_str()));
            outline.push_attribute(("type", "rss"));
            outline.push_attribute(("xmlUrl", feed.url.as_str()));
            outline.push_attribute(("htmlUrl", feed.url.as_str()));
            writer
                .write_event(Event::Empty(outline))
                .with_context(|| format!("Failed to write feed outline '{}'", feed.name))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("outline")))
            .context("Failed to write category outline end")?;
    }

    // </body></opml>
    writer
        .write_event(Event::End(BytesEnd::new("body")))
        .context("Failed to write body end")?;
    writer
        .write_event(Event::End(BytesEnd::new("opml")))
        .context("Failed to write opml end")?;

    let tree = String::from_utf8(writer.into_inner()).context("Generated OPML contains invalid UTF-8")?;

    let mut document = String::with_capacity(XML_DECLARATION.len() + tree.len() + 2);
    document.push_str(XML_DECLARATION);
    document.push('\n');
    document.push_str(&tree);
    document.push('\n');
    Ok(document)
}

/// Writes `list` as OPML to `path` atomically.
///
/// The document goes to a temporary file next to `path`, is synced to disk,
/// then renamed over the destination, so `path` never holds a partial file.
pub fn export_to_file(list: &FeedList, title: &str, path: &Path) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let content = export_opml(list, title)?;

    // Timestamp suffix; `create_new` refuses to reuse a path that already exists
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    std::io::Write::write_all(&mut file, content.as_bytes()).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write OPML to temporary file '{}'",
            temp_path.display()
        )
    })?;

    file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(file);

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote OPML file");
    Ok(())
}

/// Reads an OPML file from disk and returns its feed outlines.
pub fn read_opml_file(path: &Path) -> Result<Vec<OpmlFeed>, OpmlError> {
    let content = std::fs::read_to_string(path)?;
    parse_opml_content(&content)
}

/// Parses OPML content and returns every outline that carries `xmlUrl`.
///
/// Outlines without `xmlUrl` are treated as categories: they are not
/// returned, but their `text` (or `title`) is attached to the feeds nested
/// inside them. `xmlUrl` values are returned as written; callers decide
/// which of them count as feeds.
pub fn parse_opml_content(content: &str) -> Result<Vec<OpmlFeed>, OpmlError> {
    // SEC-002: quick-xml (0.37) never parses <!ENTITY> declarations from DOCTYPE.
    // Only the 5 XML builtins are resolved by `decode_and_unescape_value()`;
    // custom entities like &xxe; produce an `EscapeError::UnrecognizedEntity`.
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut feeds = Vec::new();
    let mut buf = Vec::new();
    // One entry per open <outline>: Some(name) for categories, None for feeds
    let mut stack: Vec<Option<String>> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"outline" => {
                // SEC-003: Reject excessively nested OPMLs
                if stack.len() >= MAX_OPML_DEPTH {
                    return Err(OpmlError::MaxDepthExceeded(MAX_OPML_DEPTH));
                }
                let outline = read_outline(&e, &reader)?;
                stack.push(outline.category_name());
                if let Some(feed) = outline.into_feed(&stack[..stack.len() - 1]) {
                    feeds.push(feed);
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"outline" => {
                let outline = read_outline(&e, &reader)?;
                if let Some(feed) = outline.into_feed(&stack) {
                    feeds.push(feed);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"outline" => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpmlError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(feeds)
}

/// Raw attributes of one `<outline>` element.
#[derive(Default)]
struct Outline {
    text: Option<String>,
    title: Option<String>,
    xml_url: Option<String>,
    html_url: Option<String>,
}

impl Outline {
    fn category_name(&self) -> Option<String> {
        if self.xml_url.is_some() {
            return None;
        }
        self.text.clone().or_else(|| self.title.clone())
    }

    /// Converts a feed outline into an [`OpmlFeed`], attributing it to the
    /// innermost enclosing category in `parents`.
    fn into_feed(self, parents: &[Option<String>]) -> Option<OpmlFeed> {
        let url = self.xml_url?;
        let category = parents.iter().rev().find_map(|p| p.clone());
        Some(OpmlFeed {
            category,
            title: self.title.or(self.text).unwrap_or_else(|| url.clone()),
            xml_url: url,
            html_url: self.html_url,
        })
    }
}

fn read_outline(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Outline, OpmlError> {
    let mut outline = Outline::default();
    let decoder = reader.decoder();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed OPML attribute");
                continue;
            }
        };
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| OpmlError::XmlParse(e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"text" => outline.text = Some(value),
            b"title" => outline.title = Some(value),
            b"xmlUrl" => outline.xml_url = Some(value),
            b"htmlUrl" => outline.html_url = Some(value),
            _ => {}
        }
    }

    Ok(outline)
}
