//! Post-processing of model output.
//!
//! The response schema asks for three suggested titles, but the model may
//! return fewer, more, blanks or repeats. Titles are normalized here so the
//! rest of the program can rely on exactly [`REQUIRED_TITLE_COUNT`] distinct
//! entries.

use serde_json::Value;

use crate::analysis::{AnalysisError, AnalysisResult};

pub const REQUIRED_TITLE_COUNT: usize = 3;

/// Padding pool, consumed in order. One placeholder per required slot is
/// always enough: each upstream title can shadow at most one placeholder.
pub const PLACEHOLDER_TITLES: [&str; REQUIRED_TITLE_COUNT] = [
    "A/B Test This Title",
    "Try a More Emotional Angle",
    "Add a Keyword-Rich Title",
];

/// Drops blank entries, deduplicates (case-sensitive, first seen wins),
/// truncates to three and pads from [`PLACEHOLDER_TITLES`].
pub fn sanitize_titles<S: AsRef<str>>(titles: &[S]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(REQUIRED_TITLE_COUNT);

    for title in titles {
        let title: &str = title.as_ref();
        if result.len() == REQUIRED_TITLE_COUNT {
            break;
        }
        if title.trim().is_empty() || result.iter().any(|t| t == title) {
            continue;
        }
        result.push(title.to_string());
    }

    let mut placeholders = PLACEHOLDER_TITLES.iter();
    while result.len() < REQUIRED_TITLE_COUNT {
        match placeholders.next() {
            Some(placeholder) if result.iter().any(|t| t == placeholder) => continue,
            Some(placeholder) => result.push(placeholder.to_string()),
            None => break,
        }
    }

    result
}

/// Strips an optional Markdown code fence around a JSON payload.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parses model text into a sanitized [`AnalysisResult`]. Non-string
/// title entries are discarded before sanitization.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let mut value: Value = serde_json::from_str(strip_code_fence(text))?;

    if let Some(suggestions) = value
        .get_mut("suggestions")
        .and_then(Value::as_object_mut)
    {
        let upstream: Vec<String> = suggestions
            .get("titles")
            .and_then(Value::as_array)
            .map(|titles| {
                titles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        suggestions.insert("titles".into(), Value::from(sanitize_titles(&upstream)));
    }

    Ok(serde_json::from_value(value)?)
}
