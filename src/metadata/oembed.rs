use reqwest::Url;
use serde::Deserialize;

use crate::metadata::types::TitleLookup;
use crate::relay::{describe_error, Relay};
use crate::video_id::VideoId;

#[derive(Debug, Clone, Deserialize)]
struct OembedResponse {
    title: String,
}

/// oEmbed request for a video, before relaying.
pub fn oembed_target(oembed_url: &Url, id: &VideoId) -> Url {
    let mut target = oembed_url.clone();
    target
        .query_pairs_mut()
        .append_pair("url", &format!("https://www.youtube.com/watch?v={id}"))
        .append_pair("format", "json");
    target
}

pub async fn lookup_title(relay: &Relay, oembed_url: &Url, id: &VideoId) -> TitleLookup {
    let target = oembed_target(oembed_url, id);
    log::info!("fetching details for video {id} using oEmbed");

    let response = match relay.get(target.as_str()).await {
        Ok(response) => response,
        Err(err) => {
            log::error!("oEmbed request for {id} failed: {}", describe_error(&err));
            return TitleLookup::Error;
        }
    };

    let status = response.status();
    if !status.is_success() {
        log::warn!("oEmbed lookup for {id} returned {status}, using a placeholder title");
        return TitleLookup::Failed;
    }

    match response.json::<OembedResponse>().await {
        Ok(data) => TitleLookup::Found(data.title),
        Err(err) => {
            log::error!("oEmbed response for {id} is malformed: {err}");
            TitleLookup::Error
        }
    }
}
