use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::storage::{self, StorageManager};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/raw";
const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";
const DEFAULT_THUMBNAIL_URL_TEMPLATE: &str = "https://i.ytimg.com/vi/{id}/maxresdefault.jpg";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Placeholder substituted with the video id in `thumbnail_url_template`
pub const ID_PLACEHOLDER: &str = "{id}";

/// Environment variables checked, in order, for the Gemini credential
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Relay the oEmbed and thumbnail requests go through
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    #[serde(default = "default_oembed_url")]
    pub oembed_url: String,

    /// Thumbnail location, `{id}` is replaced by the video id
    #[serde(default = "default_thumbnail_url_template")]
    pub thumbnail_url_template: String,

    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout. Requests may hang indefinitely when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            oembed_url: default_oembed_url(),
            thumbnail_url_template: default_thumbnail_url_template(),
            gemini_api_base: default_gemini_api_base(),
            model: default_model(),
            request_timeout_secs: None,
            base_path: PathBuf::new(),
        }
    }
}

fn default_relay_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}

fn default_oembed_url() -> String {
    DEFAULT_OEMBED_URL.to_string()
}

fn default_thumbnail_url_template() -> String {
    DEFAULT_THUMBNAIL_URL_TEMPLATE.to_string()
}

fn default_gemini_api_base() -> String {
    DEFAULT_GEMINI_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [
            ("relay_url", &self.relay_url),
            ("oembed_url", &self.oembed_url),
            ("gemini_api_base", &self.gemini_api_base),
        ] {
            url::Url::parse(value).with_context(|| format!("{key} is not a valid url: {value}"))?;
        }

        if !self.thumbnail_url_template.contains(ID_PLACEHOLDER) {
            bail!(
                "thumbnail_url_template must contain {ID_PLACEHOLDER}, got {}",
                self.thumbnail_url_template
            );
        }

        if self.model.trim().is_empty() {
            bail!("model must not be empty");
        }

        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be greater than 0");
        }

        Ok(())
    }

    pub fn load_with(base_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base_path = base_path.into();
        let store = storage::BackendLocal::new(&base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path;

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Shared HTTP client for the relay and Gemini calls.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

/// Data directory, `$TUBELENS_BASE_PATH` or `~/.local/share/tubelens`.
pub fn base_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TUBELENS_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = my_home()
        .context("Could not determine home directory")?
        .context("Home directory path is empty")?;
    Ok(home.join(".local/share/tubelens"))
}

/// Reads the Gemini credential from the environment.
pub fn api_key_from_env() -> anyhow::Result<String> {
    api_key_from(|var| std::env::var(var).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .with_context(|| format!("{} environment variable is not set", API_KEY_VARS[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_with(tmp.path()).unwrap();

        assert!(tmp.path().join(CONFIG_FILE).exists());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.base_path(), tmp.path());
    }

    #[test]
    fn test_load_fills_missing_keys() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "model: gemini-2.5-pro\n").unwrap();

        let config = Config::load_with(tmp.path()).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.oembed_url, DEFAULT_OEMBED_URL);

        let saved = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(saved.contains("relay_url"));
    }

    #[test]
    fn test_load_rejects_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "model: [unterminated\n").unwrap();
        assert!(Config::load_with(tmp.path()).is_err());
    }

    #[test]
    fn test_validate() {
        let config = Config {
            thumbnail_url_template: "https://i.ytimg.com/vi/maxresdefault.jpg".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            relay_url: "not a url".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_api_key_lookup() {
        let key = api_key_from(|var| (var == "API_KEY").then(|| " secret ".to_string())).unwrap();
        assert_eq!(key, "secret");

        let key = api_key_from(|var| match var {
            "GEMINI_API_KEY" => Some("primary".to_string()),
            _ => Some("fallback".to_string()),
        })
        .unwrap();
        assert_eq!(key, "primary");

        let err = api_key_from(|_| Some("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(api_key_from(|_| None).is_err());
    }
}
