//! Shared configuration, table records, and transformation helpers for tubeload.

pub mod app_config;
pub mod channels;
pub mod config;
pub mod records;
pub mod transform;

use thiserror::Error;

pub use app_config::AppConfig;
pub use channels::{load_channels, ChannelConfig, ChannelsFile, WarehouseTarget};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{Channel, Comment, CommentLabels, PlaylistItem, QuestionCategory, VideoDetail};
pub use transform::TransformError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read channels file {path}: {source}")]
    ChannelsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse channels file: {0}")]
    ChannelsFileParse(#[from] serde_yaml::Error),

    #[error("channels config validation failed: {0}")]
    Validation(String),
}
