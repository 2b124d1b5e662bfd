//! Tools for a curated markdown list of RSS feeds.
//!
//! The source is a markdown file where each `## ` heading names a category
//! and each `[name](url.xml)` line under it is a feed. Two operations work
//! on it:
//!
//! - [`validate::validate`] checks the source before conversion
//! - [`convert::convert`] groups feeds by category and writes an OPML file

pub mod cli;
pub mod config;
pub mod convert;
pub mod feed;
pub mod validate;
