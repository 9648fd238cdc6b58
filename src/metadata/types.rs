use serde::{Deserialize, Serialize};

use crate::video_id::VideoId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
    pub upload_date: String,
    pub duration: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub channel_subscribers: u64,
}

/// Outcome of the oEmbed title lookup
#[derive(Debug, Clone, PartialEq)]
pub enum TitleLookup {
    Found(String),
    /// The relay answered with a non-success status
    Failed,
    /// Transport error or unusable body
    Error,
}

impl TitleLookup {
    pub fn into_title(self) -> String {
        match self {
            TitleLookup::Found(title) => title,
            TitleLookup::Failed => TITLE_LOOKUP_FAILED.to_string(),
            TitleLookup::Error => TITLE_LOOKUP_ERROR.to_string(),
        }
    }
}

pub const TITLE_LOOKUP_FAILED: &str = "Sample Video Title (oEmbed fetch failed)";
pub const TITLE_LOOKUP_ERROR: &str = "Sample Video Title (Error in oEmbed fetch)";
