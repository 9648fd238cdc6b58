//! One user-triggered analysis, start to finish.
//!
//! URL → id → metadata → thumbnail → Gemini → history. Stages run one
//! after another; the thumbnail and analysis stages can abort the run,
//! metadata and history never do.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use reqwest::Url;
use serde::Serialize;

use crate::analysis::{GeminiClient, HistoricalAnalysis};
use crate::config::Config;
use crate::errors::{AppError, Stage};
use crate::history::{HistoryStore, HISTORY_CAPACITY};
use crate::metadata::{MetadataProvider, VideoMetadata};
use crate::relay::Relay;
use crate::storage::StorageManager;
use crate::thumbnail::ImageFetcher;
use crate::video_id::extract_video_id;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub video: VideoMetadata,
    /// Newest first
    pub history: Vec<HistoricalAnalysis>,
    pub selected: Option<HistoricalAnalysis>,
}

pub struct Workflow {
    metadata: MetadataProvider,
    images: ImageFetcher,
    analyzer: GeminiClient,
    history: HistoryStore,
    busy: AtomicBool,
}

/// Clears the busy flag however the run ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Workflow {
    pub fn new(
        metadata: MetadataProvider,
        images: ImageFetcher,
        analyzer: GeminiClient,
        history: HistoryStore,
    ) -> Self {
        Self {
            metadata,
            images,
            analyzer,
            history,
            busy: AtomicBool::new(false),
        }
    }

    pub fn from_config(
        config: &Config,
        api_key: impl Into<String>,
        storage: Arc<dyn StorageManager>,
    ) -> anyhow::Result<Self> {
        let client = config.http_client().context("failed to build http client")?;
        let relay = Relay::new(client.clone(), &config.relay_url).context("invalid relay_url")?;
        let oembed_url = Url::parse(&config.oembed_url).context("invalid oembed_url")?;

        Ok(Self::new(
            MetadataProvider::new(relay.clone(), oembed_url, &config.thumbnail_url_template),
            ImageFetcher::new(relay),
            GeminiClient::new(client, &config.gemini_api_base, &config.model, api_key),
            HistoryStore::new(storage),
        ))
    }

    #[cfg(test)]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Runs the whole pipeline for `url`. `on_stage` is called as each
    /// stage starts. A second call while one is in flight is rejected.
    pub async fn run(
        &self,
        url: &str,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<AnalysisOutcome, AppError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        on_stage(Stage::Validation);
        let id = extract_video_id(url).ok_or(AppError::InvalidUrl)?;

        on_stage(Stage::Metadata);
        let video = self.metadata.fetch_metadata(&id).await;

        on_stage(Stage::Thumbnail);
        let thumbnail = self.images.fetch_image_as_text(&video.thumbnail_url).await?;

        on_stage(Stage::Analysis);
        let analysis = self.analyzer.analyze(&video, &thumbnail).await?;

        on_stage(Stage::History);
        let entry = self.history.append(&id, analysis);

        let mut history = self.history.get(&id);
        if history.first() != Some(&entry) {
            // persisting failed; still show this run's report
            log::warn!("history for {id} was not updated, showing the unsaved report");
            history.insert(0, entry.clone());
            history.truncate(HISTORY_CAPACITY);
        }
        let selected = Some(entry);

        Ok(AnalysisOutcome {
            video,
            history,
            selected,
        })
    }
}

/// What the presentation layer shows: results of the last run, or its error.
#[derive(Debug, Default)]
pub struct WorkflowState {
    pub video: Option<VideoMetadata>,
    pub history: Vec<HistoricalAnalysis>,
    pub selected: Option<HistoricalAnalysis>,
    pub error: Option<String>,
}

impl WorkflowState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clears previous results, runs the workflow and records its outcome.
    /// Returns whether the run succeeded.
    pub async fn trigger(
        &mut self,
        workflow: &Workflow,
        url: &str,
        on_stage: impl FnMut(Stage),
    ) -> bool {
        self.reset();

        match workflow.run(url, on_stage).await {
            Ok(outcome) => {
                self.video = Some(outcome.video);
                self.history = outcome.history;
                self.selected = outcome.selected;
                true
            }
            Err(err) => {
                match err.stage() {
                    Some(stage) => log::error!("{stage} stage failed for {url}: {err}"),
                    None => log::error!("analysis of {url} not run: {err}"),
                }
                self.error = Some(err.user_message());
                false
            }
        }
    }

    /// Switches the displayed entry to the one stored at `timestamp`.
    pub fn select(&mut self, timestamp: &str) -> bool {
        match self.history.iter().find(|e| e.timestamp == timestamp) {
            Some(entry) => {
                self.selected = Some(entry.clone());
                true
            }
            None => false,
        }
    }
}
