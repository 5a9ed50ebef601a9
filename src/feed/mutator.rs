//! Inserting a new episode at the top of an existing feed.
//!
//! The document is streamed event by event and every original event is
//! written back unchanged, so namespace declarations, prefixed elements,
//! comments and formatting all survive. The only edits are the new `item`
//! (placed before the first existing item) and, if missing, an
//! `xmlns:itunes` declaration on the root element.

use super::{write_error, Episode, ITUNES_NS};
use crate::error::{AutocastError, Result};
use crate::persist::write_atomic;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;
use std::path::Path;
use tracing::{info, instrument};

/// Depth of the `channel` element (root is depth 1).
const CHANNEL_DEPTH: usize = 2;

/// Prepend `episode` to the feed at `feed_path`, replacing the file atomically.
#[instrument(skip(episode), fields(feed = %feed_path.display(), title = %episode.title))]
pub fn prepend(feed_path: &Path, episode: &Episode) -> Result<()> {
    let original = std::fs::read(feed_path).map_err(|e| {
        AutocastError::FeedParse(format!("Cannot read {}: {}", feed_path.display(), e))
    })?;

    let updated = prepend_to_document(&original, episode)?;

    write_atomic(feed_path, &updated).map_err(|e| {
        AutocastError::FeedWrite(format!("Cannot write {}: {}", feed_path.display(), e))
    })?;

    info!("Feed updated");
    Ok(())
}

/// Return a copy of the feed document with `episode` as its first item.
pub fn prepend_to_document(xml: &[u8], episode: &Episode) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + episode.description.len() + 512));

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut channels = 0usize;
    let mut in_channel = false;
    let mut inserted = false;
    // Whitespace between channel children is held back so the new item can
    // be placed after it and indented the same way.
    let mut pending_ws: Option<BytesText<'static>> = None;
    let mut child_indent: Option<BytesText<'static>> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            AutocastError::FeedParse(format!("{} (near byte {})", e, reader.buffer_position()))
        })?;

        let at_channel_level = in_channel && depth == CHANNEL_DEPTH;

        match event {
            Event::Eof => break,

            Event::Text(t) if at_channel_level && t.iter().all(u8::is_ascii_whitespace) => {
                let t = t.into_owned();
                if child_indent.is_none() {
                    child_indent = Some(t.clone());
                }
                if let Some(prev) = pending_ws.replace(t) {
                    emit(&mut writer, Event::Text(prev))?;
                }
            }

            Event::Start(e) => {
                let ws = pending_ws.take();
                if depth == 0 {
                    if saw_root {
                        return Err(AutocastError::FeedParse("Multiple root elements".to_string()));
                    }
                    saw_root = true;
                    flush(&mut writer, ws)?;
                    emit(&mut writer, Event::Start(with_itunes_namespace(e)?))?;
                } else if depth == CHANNEL_DEPTH - 1 && e.name().as_ref() == b"channel" {
                    channels += 1;
                    if channels > 1 {
                        return Err(AutocastError::FeedParse(
                            "Feed contains more than one channel".to_string(),
                        ));
                    }
                    in_channel = true;
                    flush(&mut writer, ws)?;
                    emit(&mut writer, Event::Start(e))?;
                } else if at_channel_level && !inserted && e.name().as_ref() == b"item" {
                    flush(&mut writer, ws.clone())?;
                    write_item(&mut writer, episode, ws.as_ref())?;
                    flush(&mut writer, ws)?;
                    inserted = true;
                    emit(&mut writer, Event::Start(e))?;
                } else {
                    flush(&mut writer, ws)?;
                    emit(&mut writer, Event::Start(e))?;
                }
                depth += 1;
            }

            Event::Empty(e) => {
                let ws = pending_ws.take();
                if depth == 0 {
                    return Err(AutocastError::FeedParse(
                        "Feed root element has no channel".to_string(),
                    ));
                } else if depth == CHANNEL_DEPTH - 1 && e.name().as_ref() == b"channel" {
                    // `<channel/>`: expand so the item has somewhere to go.
                    channels += 1;
                    if channels > 1 {
                        return Err(AutocastError::FeedParse(
                            "Feed contains more than one channel".to_string(),
                        ));
                    }
                    flush(&mut writer, ws)?;
                    let end = BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    emit(&mut writer, Event::Start(e))?;
                    write_item(&mut writer, episode, None)?;
                    emit(&mut writer, Event::End(end))?;
                    inserted = true;
                } else if at_channel_level && !inserted && e.name().as_ref() == b"item" {
                    flush(&mut writer, ws.clone())?;
                    write_item(&mut writer, episode, ws.as_ref())?;
                    flush(&mut writer, ws)?;
                    inserted = true;
                    emit(&mut writer, Event::Empty(e))?;
                } else {
                    flush(&mut writer, ws)?;
                    emit(&mut writer, Event::Empty(e))?;
                }
            }

            Event::End(e) => {
                let ws = pending_ws.take();
                if depth == 0 {
                    return Err(AutocastError::FeedParse("Unbalanced closing tag".to_string()));
                }
                if at_channel_level {
                    // Closing `</channel>` with no existing items.
                    if !inserted {
                        flush(&mut writer, child_indent.clone())?;
                        write_item(&mut writer, episode, child_indent.as_ref())?;
                        inserted = true;
                    }
                    in_channel = false;
                }
                flush(&mut writer, ws)?;
                emit(&mut writer, Event::End(e))?;
                depth -= 1;
            }

            other => {
                flush(&mut writer, pending_ws.take())?;
                emit(&mut writer, other)?;
            }
        }
    }

    if depth != 0 {
        return Err(AutocastError::FeedParse("Unexpected end of document".to_string()));
    }
    if !saw_root {
        return Err(AutocastError::FeedParse("Feed document is empty".to_string()));
    }
    if channels == 0 || !inserted {
        return Err(AutocastError::FeedParse("Feed has no channel element".to_string()));
    }

    Ok(writer.into_inner())
}

/// Add `xmlns:itunes` to the root element if it is not already declared.
fn with_itunes_namespace(root: BytesStart<'_>) -> Result<BytesStart<'static>> {
    let mut declared = false;
    for attr in root.attributes() {
        let attr = attr.map_err(|e| AutocastError::FeedParse(e.to_string()))?;
        if attr.key.as_ref() == b"xmlns:itunes" {
            declared = true;
        }
    }

    let mut root = root.into_owned();
    if !declared {
        root.push_attribute(("xmlns:itunes", ITUNES_NS));
    }
    Ok(root)
}

/// Write the `item` element for `episode`.
///
/// `indent` is the whitespace that precedes channel children; item children
/// get one extra level of two spaces.
fn write_item(writer: &mut Writer<Vec<u8>>, episode: &Episode, indent: Option<&BytesText<'_>>) -> Result<()> {
    let outer = indent
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .unwrap_or_default();
    let inner = if outer.is_empty() {
        String::new()
    } else {
        format!("{}  ", outer)
    };

    let length = episode.enclosure.length.to_string();
    let pub_date = episode.pub_date_rfc2822();

    emit(writer, Event::Start(BytesStart::new("item")))?;

    for (name, value) in [
        ("title", episode.title.as_str()),
        ("description", episode.description.as_str()),
        ("pubDate", pub_date.as_str()),
    ] {
        indent_text(writer, &inner)?;
        writer
            .create_element(name)
            .write_text_content(BytesText::new(value))
            .map_err(write_error)?;
    }

    indent_text(writer, &inner)?;
    writer
        .create_element("enclosure")
        .with_attributes([
            ("url", episode.enclosure.url.as_str()),
            ("length", length.as_str()),
            ("type", episode.enclosure.mime_type.as_str()),
        ])
        .write_empty()
        .map_err(write_error)?;

    indent_text(writer, &inner)?;
    writer
        .create_element("guid")
        .with_attribute(("isPermaLink", "false"))
        .write_text_content(BytesText::new(&episode.guid))
        .map_err(write_error)?;

    indent_text(writer, &outer)?;
    emit(writer, Event::End(BytesEnd::new("item")))
}

fn indent_text(writer: &mut Writer<Vec<u8>>, indent: &str) -> Result<()> {
    if indent.is_empty() {
        return Ok(());
    }
    emit(writer, Event::Text(BytesText::from_escaped(indent)))
}

fn flush(writer: &mut Writer<Vec<u8>>, ws: Option<BytesText<'_>>) -> Result<()> {
    match ws {
        Some(t) => emit(writer, Event::Text(t)),
        None => Ok(()),
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(write_error)
}
