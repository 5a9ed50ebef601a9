//! Podcast RSS feed maintenance.
//!
//! The feed is an RSS 2.0 document with iTunes extensions. Items are kept in
//! insertion order, newest first; this crate only ever adds an item at the
//! top and never reorders or removes existing ones.

pub mod document;
mod episode;
mod mutator;

pub use document::{read_items, FeedItem};
pub use episode::{episode_filename, episode_title, episode_url, Enclosure, Episode};
pub use mutator::{prepend, prepend_to_document};

use crate::error::AutocastError;

/// iTunes podcast namespace URI, bound to the `itunes` prefix.
pub const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

pub(crate) fn write_error<E: std::fmt::Display>(e: E) -> AutocastError {
    AutocastError::FeedWrite(format!("XML serialization failed: {}", e))
}
