use std::fmt::Display;
use std::ops::Deref;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Length of every YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// Compile YouTube regex once
static YOUTUBE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?|shorts|live)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})(?:["&?/\s#]|$)"#,
    )
    .expect("Failed to compile YouTube regex")
});

static BARE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^"&?/\s]{11}$"#).expect("Failed to compile video id regex"));

/// The 11-character token YouTube addresses a video by.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    /// Accepts a bare identifier, without any URL around it.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        BARE_ID_REGEX
            .is_match(raw)
            .then(|| VideoId(raw.to_string()))
    }

    /// Accepts either a YouTube URL or a bare identifier.
    pub fn from_url_or_id(input: &str) -> Option<Self> {
        extract_video_id(input).or_else(|| Self::parse(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for VideoId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the video identifier from watch, short-link, embed, shorts and
/// channel-path URL forms. Query parameters around the id are ignored.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    YOUTUBE_REGEX
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn id(url: &str) -> Option<String> {
        extract_video_id(url).map(|id| id.to_string())
    }

    #[test]
    fn test_equivalent_links_share_id() {
        let links = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ",
        ];

        for link in links {
            assert_eq!(id(link).as_deref(), Some(ID), "link: {link}");
        }
    }

    #[test]
    fn test_extra_query_params_ignored() {
        assert_eq!(
            id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL123").as_deref(),
            Some(ID)
        );
        assert_eq!(
            id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ?si=abcdef").as_deref(), Some(ID));
        assert_eq!(
            id("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1").as_deref(),
            Some(ID)
        );
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ#t=10").as_deref(), Some(ID));
    }

    #[test]
    fn test_trailing_path_token() {
        assert_eq!(
            id("https://www.youtube.com/user/SomeChannel/dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(id("  https://youtu.be/dQw4w9WgXcQ \n").as_deref(), Some(ID));
    }

    #[test]
    fn test_not_found() {
        let inputs = [
            "",
            "hello world",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQTooLong",
            "https://youtu.be/",
            "https://www.youtube.com/feed/subscriptions",
            "https://vimeo.com/123456789",
        ];

        for input in inputs {
            assert_eq!(id(input), None, "input: {input}");
        }
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(VideoId::parse(ID).map(|id| id.to_string()).as_deref(), Some(ID));
        assert_eq!(VideoId::parse(" dQw4w9WgXcQ ").map(|id| id.to_string()).as_deref(), Some(ID));
        assert!(VideoId::parse("dQw4w9WgXc").is_none());
        assert!(VideoId::parse("dQw4w9/gXcQ").is_none());
    }

    #[test]
    fn test_from_url_or_id() {
        let from_url = VideoId::from_url_or_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let from_id = VideoId::from_url_or_id(ID).unwrap();
        assert_eq!(from_url, from_id);
        assert_eq!(from_url.to_string(), ID);
        assert_eq!(from_url.len(), VIDEO_ID_LEN);
    }
}
