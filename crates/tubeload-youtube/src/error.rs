use thiserror::Error;
use tubeload_core::TransformError;

/// Errors returned by the YouTube Data API client. All of them end the run.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the call because the project's quota is spent.
    #[error("YouTube API quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Any other non-2xx response, with the reason from the error envelope.
    #[error("YouTube API error {status} ({reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A field was present but could not be coerced (timestamp, duration, count).
    #[error("invalid field in {context}: {source}")]
    Transform {
        context: String,
        #[source]
        source: TransformError,
    },

    /// The API returned an item that was not asked for.
    #[error("unexpected {resource} '{id}' in response")]
    UnexpectedItem { resource: &'static str, id: String },

    /// Tracked channel IDs that no `channels.list` response contained,
    /// usually a mistyped or deleted channel.
    #[error("channels not returned by the API: {}", .missing.join(", "))]
    MissingChannels { missing: Vec<String> },

    #[error("pagination limit reached for playlist {playlist_id}: exceeded {max_pages} pages")]
    PaginationLimit {
        playlist_id: String,
        max_pages: usize,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
