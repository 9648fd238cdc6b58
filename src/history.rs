//! Per-video history of past analyses.
//!
//! The whole map of video id to entries lives under a single storage key
//! and is rewritten on every append. History is a convenience: read
//! failures yield an empty history and write failures are only logged.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::analysis::{AnalysisResult, HistoricalAnalysis};
use crate::storage::StorageManager;
use crate::video_id::VideoId;

pub const HISTORY_KEY: &str = "analysis_history.json";

/// Entries kept per video id, newest first
pub const HISTORY_CAPACITY: usize = 10;

type HistoryMap = BTreeMap<String, Vec<HistoricalAnalysis>>;

pub struct HistoryStore {
    storage: Arc<dyn StorageManager>,
    append_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn StorageManager>) -> Self {
        Self {
            storage,
            append_lock: Mutex::new(()),
        }
    }

    /// Entries for `id`, newest first. Empty when none are stored.
    pub fn get(&self, id: &VideoId) -> Vec<HistoricalAnalysis> {
        self.load().remove(id.as_str()).unwrap_or_default()
    }

    /// Stamps `result` and stores it as the newest entry for `id`,
    /// dropping entries beyond [`HISTORY_CAPACITY`]. The stamped entry is
    /// returned whether or not it could be persisted.
    pub fn append(&self, id: &VideoId, result: AnalysisResult) -> HistoricalAnalysis {
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _file_lock = match self.storage.lock_exclusive() {
            Ok(lock) => lock,
            Err(err) => {
                log::error!("failed to lock history, entry for {id} not saved: {err}");
                return HistoricalAnalysis {
                    analysis: result,
                    timestamp: now_timestamp(),
                };
            }
        };

        let mut history = self.load();
        let entries = history.entry(id.to_string()).or_default();

        let entry = HistoricalAnalysis {
            analysis: result,
            timestamp: next_timestamp(entries.first().map(|e| e.timestamp.as_str())),
        };
        entries.insert(0, entry.clone());
        entries.truncate(HISTORY_CAPACITY);

        self.save(&history);
        entry
    }

    fn load(&self) -> HistoryMap {
        if !self.storage.exists(HISTORY_KEY) {
            return HistoryMap::new();
        }

        let parsed = self
            .storage
            .read(HISTORY_KEY)
            .map_err(|e| e.to_string())
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()));

        match parsed {
            Ok(history) => history,
            Err(err) => {
                log::error!("failed to read history from {HISTORY_KEY}, treating it as empty: {err}");
                HistoryMap::new()
            }
        }
    }

    fn save(&self, history: &HistoryMap) {
        let result = serde_json::to_vec(history)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                self.storage
                    .write(HISTORY_KEY, &bytes)
                    .map_err(|e| e.to_string())
            });

        if let Err(err) = result {
            log::error!("failed to save history to {HISTORY_KEY}: {err}");
        }
    }
}

/// ISO-8601 UTC with microsecond precision, e.g. `2026-10-18T09:12:44.512093Z`.
fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Current time, or one microsecond past `latest` when the clock has not
/// moved beyond it. Timestamps are selection keys and must stay unique.
fn next_timestamp(latest: Option<&str>) -> String {
    let now = Utc::now();
    let floor = latest
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc) + chrono::Duration::microseconds(1));

    match floor {
        Some(floor) if floor > now => format_timestamp(floor),
        _ => format_timestamp(now),
    }
}

fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}
