use std::fmt::Display;

use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::thumbnail::ThumbnailError;

/// Workflow stages, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Metadata,
    Thumbnail,
    Analysis,
    History,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Validation => "url validation",
            Stage::Metadata => "metadata lookup",
            Stage::Thumbnail => "thumbnail fetch",
            Stage::Analysis => "analysis",
            Stage::History => "history update",
        };
        f.write_str(label)
    }
}

/// Errors surfaced to the user.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid YouTube URL. Please enter a valid video link.")]
    InvalidUrl,

    #[error("{stage} failed: {message}")]
    Network { stage: Stage, message: String },

    #[error("{stage} failed, response could not be parsed: {message}")]
    Parse { stage: Stage, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("an analysis is already running")]
    Busy,
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Stage the error originated from, when it belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::InvalidUrl => Some(Stage::Validation),
            AppError::Network { stage, .. } | AppError::Parse { stage, .. } => Some(*stage),
            AppError::Configuration(_) | AppError::Busy => None,
        }
    }

    /// Message shown to the user in place of the results view.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidUrl | AppError::Busy => self.to_string(),
            _ => format!("An error occurred during analysis. Details: {self}"),
        }
    }
}

impl From<ThumbnailError> for AppError {
    fn from(err: ThumbnailError) -> Self {
        let stage = Stage::Thumbnail;
        match err {
            ThumbnailError::Decode(_) => AppError::Parse {
                stage,
                message: err.to_string(),
            },
            _ => AppError::Network {
                stage,
                message: err.to_string(),
            },
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let stage = Stage::Analysis;
        match err {
            AnalysisError::Json(_) => AppError::Parse {
                stage,
                message: err.to_string(),
            },
            _ => AppError::Network {
                stage,
                message: err.to_string(),
            },
        }
    }
}
