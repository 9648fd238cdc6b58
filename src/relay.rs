//! CORS-bypass relay the oEmbed and thumbnail requests are routed through.
//!
//! The relay takes the real target as a single percent-encoded `url` query
//! parameter and answers with the target's raw response body.

use std::error::Error;

use reqwest::{Client, Response, Url};

#[derive(Clone, Debug)]
pub struct Relay {
    client: Client,
    base: Url,
}

impl Relay {
    pub fn new(client: Client, relay_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            base: Url::parse(relay_url)?,
        })
    }

    /// Relay URL carrying `target` as its `url` parameter.
    pub fn wrap(&self, target: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("url", target);
        url
    }

    pub async fn get(&self, target: &str) -> reqwest::Result<Response> {
        let url = self.wrap(target);
        log::debug!("relay GET {target}");
        self.client.get(url).send().await
    }
}

/// Innermost cause of a reqwest failure, usually the readable one.
pub fn describe_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_encodes_target() {
        let relay = Relay::new(Client::new(), "https://api.allorigins.win/raw").unwrap();
        let wrapped = relay.wrap("https://www.youtube.com/oembed?url=https://youtu.be/x&format=json");

        assert_eq!(wrapped.path(), "/raw");
        let pairs: Vec<_> = wrapped.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "url");
        assert_eq!(
            pairs[0].1,
            "https://www.youtube.com/oembed?url=https://youtu.be/x&format=json"
        );
        assert!(!wrapped.as_str().contains("&format"));
    }

    #[test]
    fn test_invalid_relay_url() {
        assert!(Relay::new(Client::new(), "::nope").is_err());
    }
}
