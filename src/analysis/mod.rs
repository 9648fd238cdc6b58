pub mod gemini;
pub mod prompt;
pub mod sanitize;

pub use gemini::GeminiClient;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFeedback {
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    /// Exactly three distinct, non-empty titles once sanitized
    pub titles: Vec<String>,
    pub description: String,
    pub thumbnail: String,
}

/// Structured report returned by the model. Scores are nominally 0-100
/// and passed through as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title_analysis: ScoredFeedback,
    pub description_analysis: ScoredFeedback,
    pub thumbnail_analysis: ScoredFeedback,
    pub engagement_analysis: Feedback,
    pub virality_score: f64,
    pub why_viral: String,
    pub suggestions: Suggestions,
    pub predicted_audience: String,
    pub action_items: Vec<String>,
}

/// An analysis persisted to history, keyed by when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAnalysis {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub timestamp: String,
}

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("request to Gemini failed: {0}")]
    Request(String),

    #[error("Gemini returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Gemini response contained no text{0}")]
    EmptyResponse(String),

    #[error("Gemini response is not valid analysis JSON: {0}")]
    Json(#[from] serde_json::Error),
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_historical_analysis_is_flat() {
        let analysis: AnalysisResult =
            serde_json::from_value(fixtures::analysis_json(json!(["A", "B", "C"]))).unwrap();
        let entry = HistoricalAnalysis {
            analysis,
            timestamp: "2026-10-18T09:12:44.512Z".into(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["timestamp"], "2026-10-18T09:12:44.512Z");
        assert_eq!(value["viralityScore"], 64.0);
        assert_eq!(value["suggestions"]["titles"], json!(["A", "B", "C"]));

        let back: HistoricalAnalysis = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_scores_not_clamped() {
        let mut value = fixtures::analysis_json(json!(["A", "B", "C"]));
        value["viralityScore"] = json!(140);
        value["titleAnalysis"]["score"] = json!(-5);

        let analysis: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(analysis.virality_score, 140.0);
        assert_eq!(analysis.title_analysis.score, -5.0);
    }
}
