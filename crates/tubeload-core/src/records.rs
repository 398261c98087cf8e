//! Typed rows for the tables a run builds.
//!
//! Field names match the warehouse column names; `Serialize` output is what
//! the load layer validates and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked channel's metadata and counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub channel_id: String,
    pub channel_name: String,
    pub view_count: i64,
    pub subscriber_count: i64,
    pub video_count: i64,
    /// The channel's uploads playlist.
    pub playlist_id: String,
}

/// One video listed in a channel's uploads playlist.
///
/// Intermediate only: playlist items drive the video and comment fetches but
/// are never loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    pub channel_name: String,
    /// 1 = most recent within the channel. Zero until ranked.
    pub recency_rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDetail {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub duration_sec: f64,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Statement,
    Question,
}

impl std::fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionCategory::Statement => write!(f, "statement"),
            QuestionCategory::Question => write!(f, "question"),
        }
    }
}

/// Classifier output attached to a comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentLabels {
    pub sentiment: String,
    pub sentiment_score: f64,
    pub question_category: QuestionCategory,
    pub question_score: f64,
}

/// A top-level comment on one of the latest videos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub comment_id: String,
    pub video_id: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
    pub text_display: String,
    pub author_name: String,
    pub like_count: i64,
    /// `None` until the classification stage runs. Unlabelled comments
    /// serialize without the label columns and fail schema validation.
    #[serde(flatten)]
    pub labels: Option<CommentLabels>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_comment(labels: Option<CommentLabels>) -> Comment {
        Comment {
            comment_id: "c1".to_string(),
            video_id: "v1".to_string(),
            channel_id: "UC1".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            text_display: "nice video".to_string(),
            author_name: "@viewer".to_string(),
            like_count: 3,
            labels,
        }
    }

    #[test]
    fn question_category_serializes_lowercase() {
        let json = serde_json::to_value(QuestionCategory::Question).unwrap();
        assert_eq!(json, serde_json::json!("question"));
        assert_eq!(QuestionCategory::Statement.to_string(), "statement");
    }

    #[test]
    fn labelled_comment_flattens_label_columns() {
        let comment = sample_comment(Some(CommentLabels {
            sentiment: "positive".to_string(),
            sentiment_score: 0.91,
            question_category: QuestionCategory::Statement,
            question_score: 0.88,
        }));
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["question_category"], "statement");
        assert_eq!(json["published_at"], "2024-03-01T12:00:00Z");
        assert!(json.get("labels").is_none());
    }

    #[test]
    fn unlabelled_comment_omits_label_columns() {
        let json = serde_json::to_value(sample_comment(None)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        assert!(!obj.contains_key("sentiment"));
    }
}
