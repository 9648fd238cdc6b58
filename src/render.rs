use std::fmt::{self, Display};

use crate::analysis::HistoricalAnalysis;
use crate::metadata::VideoMetadata;

/// Coarse label for a 0-100 score.
pub fn score_band(score: f64) -> &'static str {
    if score < 40.0 {
        "low"
    } else if score < 70.0 {
        "fair"
    } else {
        "good"
    }
}

fn score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}/100 ({})", score_band(value))
    } else {
        format!("{value:.1}/100 ({})", score_band(value))
    }
}

/// Text listing of past analyses, the selected one marked with `*`.
pub struct HistoryList<'a> {
    pub history: &'a [HistoricalAnalysis],
    pub selected: Option<&'a str>,
}

impl Display for HistoryList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.history.is_empty() {
            return writeln!(f, "No past analyses.");
        }

        for (idx, entry) in self.history.iter().enumerate() {
            let marker = if Some(entry.timestamp.as_str()) == self.selected {
                '*'
            } else {
                ' '
            };
            writeln!(
                f,
                "{marker} [{idx}] {}  virality {}",
                entry.timestamp,
                score(entry.analysis.virality_score)
            )?;
        }
        Ok(())
    }
}

/// Full report for the selected entry.
pub struct Report<'a> {
    /// Preview block, omitted for entries read back from history alone
    pub video: Option<&'a VideoMetadata>,
    pub history: &'a [HistoricalAnalysis],
    pub selected: &'a HistoricalAnalysis,
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.selected;
        let analysis = &entry.analysis;

        if let Some(video) = self.video {
            writeln!(f, "{}", video.title)?;
            writeln!(f, "https://www.youtube.com/watch?v={}", video.id)?;
            writeln!(f, "thumbnail: {}", video.thumbnail_url)?;
            writeln!(
                f,
                "{} views · {} likes · {} comments · {} subscribers",
                video.view_count, video.like_count, video.comment_count, video.channel_subscribers
            )?;
            writeln!(f)?;
        }

        writeln!(f, "Analysis from {}", entry.timestamp)?;
        writeln!(f, "  Title score:     {}", score(analysis.title_analysis.score))?;
        writeln!(f, "  Thumbnail score: {}", score(analysis.thumbnail_analysis.score))?;
        writeln!(f, "  Virality score:  {}", score(analysis.virality_score))?;
        writeln!(f)?;

        section(f, "Predicted Audience", &analysis.predicted_audience)?;
        section(f, "What's Working (Why it could be viral)", &analysis.why_viral)?;
        section(f, "Title Analysis", &analysis.title_analysis.feedback)?;
        section(f, "Description Analysis", &analysis.description_analysis.feedback)?;
        section(f, "Thumbnail Analysis", &analysis.thumbnail_analysis.feedback)?;
        section(f, "Engagement Analysis", &analysis.engagement_analysis.feedback)?;

        writeln!(f, "Suggested Titles")?;
        for title in &analysis.suggestions.titles {
            writeln!(f, "  - {title}")?;
        }
        writeln!(f)?;
        section(f, "Suggested Description", &analysis.suggestions.description)?;
        section(f, "Thumbnail Improvement", &analysis.suggestions.thumbnail)?;

        writeln!(f, "Action Items")?;
        for (idx, item) in analysis.action_items.iter().enumerate() {
            writeln!(f, "  {}. {item}", idx + 1)?;
        }
        writeln!(f)?;

        writeln!(f, "History")?;
        write!(
            f,
            "{}",
            HistoryList {
                history: self.history,
                selected: Some(entry.timestamp.as_str()),
            }
        )
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str, body: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    for line in body.lines() {
        writeln!(f, "  {line}")?;
    }
    writeln!(f)
}
