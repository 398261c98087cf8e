//! Pure per-table transformations: entity decoding, duration and timestamp
//! parsing, count coercion, and recency ranking.

mod duration;
mod html;
mod rank;
mod scalar;

use thiserror::Error;

pub use duration::parse_duration_secs;
pub use html::{unescape_comment_text, unescape_html};
pub use rank::{assign_recency_rank, latest_video_ids};
pub use scalar::{parse_count, parse_timestamp, TIMESTAMP_FORMAT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("invalid timestamp \"{value}\": expected YYYY-MM-DDTHH:MM:SSZ")]
    Timestamp { value: String },

    #[error("invalid ISO-8601 duration \"{value}\": {reason}")]
    Duration { value: String, reason: String },

    #[error("invalid {field} \"{value}\": expected a non-negative integer")]
    Count { field: String, value: String },
}
