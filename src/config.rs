//! Run options for the validator and the converter.
//!
//! Neither tool reads a configuration file. Every tunable has a compiled-in
//! default here, and the binaries expose a couple of optional flags that
//! override them without changing positional arity.

// ============================================================================
// Defaults
// ============================================================================

/// Minimum number of valid feed links a source must carry.
///
/// A source below this count is treated as a likely data-wipe and rejected.
pub const MIN_LINKS: usize = 10;

/// Title written into `<head><title>` of every generated OPML document.
pub const OPML_TITLE: &str = "安全技术公众号 created by tmr [https://wechat2rss.xlab.app]";

/// Spaces per nesting level in generated OPML.
pub const OPML_INDENT: usize = 4;

// ============================================================================
// Option Structs
// ============================================================================

/// Options for [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Reject sources with fewer valid links than this.
    pub min_links: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            min_links: MIN_LINKS,
        }
    }
}

/// Options for [`crate::convert::convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Text of the OPML `<head><title>` element.
    pub title: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            title: OPML_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validate_options() {
        let options = ValidateOptions::default();
        assert_eq!(options.min_links, 10);
    }

    #[test]
    fn test_default_convert_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.title, OPML_TITLE);
        assert!(options.title.contains("wechat2rss.xlab.app"));
    }
}
