use serde_json::{json, Value};

use crate::analysis::sanitize::REQUIRED_TITLE_COUNT;
use crate::metadata::VideoMetadata;

/// Instruction sent alongside the thumbnail.
pub fn build_prompt(video: &VideoMetadata) -> String {
    format!(
        r#"Act as an expert YouTube growth strategist. Analyze the provided YouTube video metadata and thumbnail image.
Be critical and specific, and give advice the creator can act on.

Video Metadata:
- Title: {title}
- Description: {description}
- Tags: {tags}
- View Count: {views}
- Like Count: {likes}
- Comment Count: {comments}
- Channel Subscribers: {subscribers}

Using the metadata and the thumbnail, produce the analysis below as JSON that follows the provided schema exactly.

1. Title Analysis: SEO, length, keyword usage, emotional hooks and click-through potential.
2. Description Analysis: keyword density, clarity, relevant links and hashtag usage.
3. Thumbnail Analysis: visual appeal of the attached image, readability, color contrast, use of faces and overall clarity.
4. Engagement Analysis: compare views, likes and comments against the subscriber count and say whether engagement is strong, average or weak for a channel of this size.
5. Virality Score: an overall 0-100 score for the video's potential to go viral.
6. Why Viral / Why Not: explain in plain English what helps or hurts its virality.
7. Suggestions:
   - {title_count} better, SEO-optimized titles.
   - An improved description.
   - A concept for a more effective thumbnail.
8. Predicted Audience: who this video is most likely to reach.
9. Action Items: the top 3 most important steps the creator should take.

Your response must be a single JSON object."#,
        title = video.title,
        description = video.description,
        tags = video.tags.join(", "),
        views = video.view_count,
        likes = video.like_count,
        comments = video.comment_count,
        subscribers = video.channel_subscribers,
        title_count = REQUIRED_TITLE_COUNT,
    )
}

fn scored(what: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER", "description": format!("Score from 0-100 for {what}.") },
            "feedback": { "type": "STRING", "description": "Detailed feedback on strengths and weaknesses." }
        },
        "required": ["score", "feedback"]
    })
}

/// Structured-output schema mirroring `AnalysisResult`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "titleAnalysis": scored("title SEO, emotional hook and CTR potential"),
            "descriptionAnalysis": scored("description keyword density, clarity and use of links/hashtags"),
            "thumbnailAnalysis": scored("thumbnail readability, color contrast and emotional impact"),
            "engagementAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "feedback": {
                        "type": "STRING",
                        "description": "Engagement (views, likes, comments) relative to subscriber count."
                    }
                },
                "required": ["feedback"]
            },
            "viralityScore": {
                "type": "NUMBER",
                "description": "A score from 0-100 for the video's potential to go viral."
            },
            "whyViral": {
                "type": "STRING",
                "description": "Plain English explanation of what could make the video go viral or hold it back."
            },
            "suggestions": {
                "type": "OBJECT",
                "properties": {
                    "titles": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": format!("{REQUIRED_TITLE_COUNT} alternative, SEO-optimized titles.")
                    },
                    "description": {
                        "type": "STRING",
                        "description": "An improved, keyword-rich description."
                    },
                    "thumbnail": {
                        "type": "STRING",
                        "description": "A better thumbnail concept, e.g. a close-up shot with bright, bold text."
                    }
                },
                "required": ["titles", "description", "thumbnail"]
            },
            "predictedAudience": {
                "type": "STRING",
                "description": "The most likely audience for this video."
            },
            "actionItems": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "The top 3 most impactful actions the creator can take."
            }
        },
        "required": [
            "titleAnalysis",
            "descriptionAnalysis",
            "thumbnailAnalysis",
            "engagementAnalysis",
            "viralityScore",
            "whyViral",
            "suggestions",
            "predictedAudience",
            "actionItems"
        ]
    })
}
