//! The record published for each run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One published episode: audio location plus feed metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    /// Full script text.
    pub description: String,
    pub pub_date: DateTime<Utc>,
    pub enclosure: Enclosure,
    /// Opaque identifier, not a link.
    pub guid: String,
}

/// Audio file reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub length: u64,
    pub mime_type: String,
}

impl Episode {
    /// Build the episode for `topic` published on `date`, with a fresh GUID.
    pub fn new(
        date: NaiveDate,
        topic: &str,
        script: &str,
        pub_date: DateTime<Utc>,
        enclosure: Enclosure,
    ) -> Self {
        Self {
            title: episode_title(date, topic),
            description: script.to_string(),
            pub_date,
            enclosure,
            guid: Uuid::new_v4().to_string(),
        }
    }

    /// Publication timestamp in RFC 2822 form with a `+0000` offset.
    pub fn pub_date_rfc2822(&self) -> String {
        self.pub_date.to_rfc2822()
    }
}

/// Title shown in podcast players, e.g. `2026-10-19 — Tides`.
pub fn episode_title(date: NaiveDate, topic: &str) -> String {
    format!("{} — {}", date.format("%Y-%m-%d"), topic)
}

/// Audio file name for a run date, e.g. `2026-10-19.mp3`.
pub fn episode_filename(date: NaiveDate, extension: &str) -> String {
    format!("{}.{}", date.format("%Y-%m-%d"), extension)
}

/// Public URL of an episode file.
pub fn episode_url(base_url: &str, episodes_subdir: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        episodes_subdir.trim_matches('/'),
        filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_filename_and_url() {
        let filename = episode_filename(date(), "mp3");
        assert_eq!(filename, "2026-10-19.mp3");
        assert_eq!(
            episode_url("https://pod.example.org/", "episodes", &filename),
            "https://pod.example.org/episodes/2026-10-19.mp3"
        );
    }

    #[test]
    fn test_pub_date_format() {
        let episode = Episode::new(
            date(),
            "Tides",
            "script",
            Utc.with_ymd_and_hms(2026, 10, 19, 6, 30, 0).unwrap(),
            Enclosure {
                url: "u".to_string(),
                length: 1,
                mime_type: "audio/mpeg".to_string(),
            },
        );
        assert_eq!(episode.pub_date_rfc2822(), "Mon, 19 Oct 2026 06:30:00 +0000");
        assert_eq!(episode.title, "2026-10-19 — Tides");
    }

    #[test]
    fn test_guids_are_unique_and_not_links() {
        let enclosure = Enclosure {
            url: "u".to_string(),
            length: 1,
            mime_type: "audio/mpeg".to_string(),
        };
        let a = Episode::new(date(), "T", "s", Utc::now(), enclosure.clone());
        let b = Episode::new(date(), "T", "s", Utc::now(), enclosure);
        assert_ne!(a.guid, b.guid);
        assert!(!a.guid.contains("://"));
    }
}
