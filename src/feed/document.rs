//! Creating and reading feed documents.

use super::{write_error, ITUNES_NS};
use crate::config::ChannelSettings;
use crate::error::{AutocastError, Result};
use crate::persist::write_atomic;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// An `item` as found in an existing feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub pub_date: String,
    pub enclosure_url: String,
    pub enclosure_length: Option<u64>,
    pub enclosure_type: String,
    pub guid: String,
}

/// Write a new feed with channel metadata and no items.
///
/// Refuses to replace an existing file.
pub fn create(path: &Path, channel: &ChannelSettings) -> Result<()> {
    if path.exists() {
        return Err(AutocastError::InvalidInput(format!(
            "Feed already exists at {}",
            path.display()
        )));
    }

    let xml = render_empty_feed(channel)?;
    write_atomic(path, &xml).map_err(|e| {
        AutocastError::FeedWrite(format!("Cannot write {}: {}", path.display(), e))
    })
}

fn render_empty_feed(channel: &ChannelSettings) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:itunes", ITUNES_NS));
    writer.write_event(Event::Start(rss)).map_err(write_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(write_error)?;

    let explicit = if channel.explicit { "true" } else { "false" };
    for (name, value) in [
        ("title", channel.title.as_str()),
        ("link", channel.link.as_str()),
        ("description", channel.description.as_str()),
        ("language", channel.language.as_str()),
        ("itunes:author", channel.author.as_str()),
        ("itunes:explicit", explicit),
    ] {
        writer
            .create_element(name)
            .write_text_content(BytesText::new(value))
            .map_err(write_error)?;
    }

    writer
        .create_element("itunes:category")
        .with_attribute(("text", channel.category.as_str()))
        .write_empty()
        .map_err(write_error)?;
    if let Some(image) = &channel.image_url {
        writer
            .create_element("itunes:image")
            .with_attribute(("href", image.as_str()))
            .write_empty()
            .map_err(write_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(write_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .map_err(write_error)?;

    let mut xml = writer.into_inner().into_inner();
    xml.push(b'\n');
    Ok(xml)
}

/// Read the items of a feed in document order (newest first).
pub fn read_items(path: &Path) -> Result<Vec<FeedItem>> {
    let content = std::fs::read(path).map_err(|e| {
        AutocastError::FeedParse(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_items(&content)
}

/// Parse the items out of a feed document.
pub fn parse_items(xml: &[u8]) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<Vec<u8>> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            AutocastError::FeedParse(format!("{} (near byte {})", e, reader.buffer_position()))
        })?;

        match event {
            Event::Eof => break,
            Event::Start(e) => match e.name().as_ref() {
                b"item" => current = Some(FeedItem::default()),
                b"enclosure" => read_enclosure(&e, current.as_mut())?,
                name => field = Some(name.to_vec()),
            },
            Event::Empty(e) if e.name().as_ref() == b"enclosure" => {
                read_enclosure(&e, current.as_mut())?
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| AutocastError::FeedParse(e.to_string()))?;
                set_field(current.as_mut(), field.as_deref(), &text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c);
                set_field(current.as_mut(), field.as_deref(), &text);
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                field = None;
            }
            _ => {}
        }
    }

    Ok(items)
}

fn set_field(item: Option<&mut FeedItem>, field: Option<&[u8]>, text: &str) {
    let Some(item) = item else { return };
    let target = match field {
        Some(b"title") => &mut item.title,
        Some(b"description") => &mut item.description,
        Some(b"pubDate") => &mut item.pub_date,
        Some(b"guid") => &mut item.guid,
        _ => return,
    };
    target.push_str(text);
}

fn read_enclosure(e: &BytesStart<'_>, item: Option<&mut FeedItem>) -> Result<()> {
    let Some(item) = item else { return Ok(()) };
    for attr in e.attributes() {
        let attr = attr.map_err(|e| AutocastError::FeedParse(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| AutocastError::FeedParse(e.to_string()))?;
        match attr.key.as_ref() {
            b"url" => item.enclosure_url = value.into_owned(),
            b"length" => item.enclosure_length = value.trim().parse().ok(),
            b"type" => item.enclosure_type = value.into_owned(),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_read_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");

        let channel = ChannelSettings {
            image_url: Some("https://example.com/cover.jpg".to_string()),
            ..ChannelSettings::default()
        };
        create(&path, &channel).unwrap();

        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("xmlns:itunes=\"{}\"", ITUNES_NS)));
        assert!(xml.contains("<itunes:image href=\"https://example.com/cover.jpg\"/>"));
        assert!(read_items(&path).unwrap().is_empty());
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, "<rss/>").unwrap();

        assert!(create(&path, &ChannelSettings::default()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<rss/>");
    }

    #[test]
    fn test_parse_items() {
        let xml = br#"<?xml version="1.0"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Show</title>
    <item>
      <title>Fish &amp; Chips</title>
      <description><![CDATA[Long <b>script</b>]]></description>
      <pubDate>Mon, 19 Oct 2026 06:30:00 +0000</pubDate>
      <enclosure url="https://e.com/episodes/a.mp3" length="1234" type="audio/mpeg"/>
      <guid isPermaLink="false">abc</guid>
      <itunes:duration>10:00</itunes:duration>
    </item>
    <item>
      <title>Second</title>
    </item>
  </channel>
</rss>"#;

        let items = parse_items(xml).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Fish & Chips");
        assert_eq!(items[0].description, "Long <b>script</b>");
        assert_eq!(items[0].enclosure_url, "https://e.com/episodes/a.mp3");
        assert_eq!(items[0].enclosure_length, Some(1234));
        assert_eq!(items[0].guid, "abc");
        assert_eq!(items[1].title, "Second");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_items(b"<rss><channel><item></channel></rss>"),
            Err(AutocastError::FeedParse(_))
        ));
    }
}
