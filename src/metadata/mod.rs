pub mod oembed;
pub mod types;

pub use types::VideoMetadata;

use rand::Rng;
use reqwest::Url;

use crate::relay::Relay;
use crate::video_id::VideoId;

use std::ops::Range;

pub const VIEW_RANGE: Range<u64> = 10_000..5_010_000;
pub const LIKE_RANGE: Range<u64> = 500..200_500;
pub const COMMENT_RANGE: Range<u64> = 100..15_100;
pub const SUBSCRIBER_RANGE: Range<u64> = 50_000..2_050_000;

const SAMPLE_TAGS: [&str; 4] = ["video analysis", "sample tag", "mock data", "seo"];
const SAMPLE_UPLOAD_DATE: &str = "2023-10-26T14:00:00Z";
const SAMPLE_DURATION: &str = "08:15";

/// Resolves a video id into metadata. Only the title is looked up; the
/// rest is synthesized since no Data API key is involved.
#[derive(Clone, Debug)]
pub struct MetadataProvider {
    relay: Relay,
    oembed_url: Url,
    thumbnail_url_template: String,
}

impl MetadataProvider {
    pub fn new(relay: Relay, oembed_url: Url, thumbnail_url_template: impl Into<String>) -> Self {
        Self {
            relay,
            oembed_url,
            thumbnail_url_template: thumbnail_url_template.into(),
        }
    }

    /// Never fails: a failed title lookup falls back to a placeholder title.
    pub async fn fetch_metadata(&self, id: &VideoId) -> VideoMetadata {
        let title = oembed::lookup_title(&self.relay, &self.oembed_url, id)
            .await
            .into_title();

        synthesize(
            id,
            title,
            self.thumbnail_url_template
                .replace(crate::config::ID_PLACEHOLDER, id),
        )
    }
}

fn synthesize(id: &VideoId, title: String, thumbnail_url: String) -> VideoMetadata {
    let mut rng = rand::rng();

    VideoMetadata {
        id: id.clone(),
        description: sample_description(&title),
        title,
        thumbnail_url,
        tags: SAMPLE_TAGS.iter().map(|t| t.to_string()).collect(),
        upload_date: SAMPLE_UPLOAD_DATE.to_string(),
        duration: SAMPLE_DURATION.to_string(),
        view_count: rng.random_range(VIEW_RANGE),
        like_count: rng.random_range(LIKE_RANGE),
        comment_count: rng.random_range(COMMENT_RANGE),
        channel_subscribers: rng.random_range(SUBSCRIBER_RANGE),
    }
}

fn sample_description(title: &str) -> String {
    format!(
        "Sample description for \"{title}\". Without a YouTube Data API key the real description \
is not available; a typical one would summarize the content, link social accounts and add \
hashtags for discoverability.

Timestamps:
0:00 - Intro
1:30 - Key Point 1
3:45 - Demonstration
5:20 - Common Mistakes
7:00 - Conclusion & Call to Action

#sample #mockdata #youtubeanalysis"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_fields() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        for _ in 0..50 {
            let meta = synthesize(&id, "Some Title".into(), "https://thumb".into());

            assert_eq!(meta.id, id);
            assert_eq!(meta.title, "Some Title");
            assert!(meta.description.contains("\"Some Title\""));
            assert_eq!(meta.tags, SAMPLE_TAGS);
            assert!(VIEW_RANGE.contains(&meta.view_count));
            assert!(LIKE_RANGE.contains(&meta.like_count));
            assert!(COMMENT_RANGE.contains(&meta.comment_count));
            assert!(SUBSCRIBER_RANGE.contains(&meta.channel_subscribers));
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let meta = synthesize(&id, "t".into(), "u".into());
        let value = serde_json::to_value(&meta).unwrap();

        assert_eq!(value["id"], "dQw4w9WgXcQ");
        assert_eq!(value["thumbnailUrl"], "u");
        assert!(value["channelSubscribers"].is_u64());
    }
}
