use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::MockServer;

use crate::analysis::fixtures::analysis_json;
use crate::config::Config;
use crate::relay::Relay;
use crate::storage::{BackendMemory, StorageManager};
use crate::video_id::VideoId;
use crate::workflow::Workflow;


pub const VIDEO_ID: &str = "dQw4w9WgXcQ";
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const THUMBNAIL_URL: &str = "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg";
pub const API_KEY: &str = "test-key";
pub const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

/// JPEG SOI marker followed by a JFIF APP0 header, enough for sniffing
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

pub fn video_id() -> VideoId {
    VideoId::parse(VIDEO_ID).unwrap()
}

/// Config with the relay and Gemini pointed at `server`.
pub fn mock_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.relay_url = format!("{}/raw", server.uri());
    config.gemini_api_base = server.uri();
    config.validate().expect("mock config must be valid");
    config
}

pub fn mock_relay(server: &MockServer) -> Relay {
    let config = mock_config(server);
    Relay::new(config.http_client().unwrap(), &config.relay_url).unwrap()
}

/// Workflow over in-memory storage. The storage is returned so tests can
/// inspect what was persisted.
pub fn create_workflow(server: &MockServer) -> (Workflow, Arc<BackendMemory>) {
    let storage = Arc::new(BackendMemory::new());
    let workflow = Workflow::from_config(
        &mock_config(server),
        API_KEY,
        storage.clone() as Arc<dyn StorageManager>,
    )
    .expect("failed to build workflow");
    (workflow, storage)
}

/// Gemini envelope carrying `text` as the first candidate's only part.
pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [{ "text": text }] } }
        ]
    })
}

/// Gemini envelope carrying a schema-conformant analysis.
pub fn gemini_analysis_body(titles: Value) -> Value {
    gemini_body(&analysis_json(titles).to_string())
}
