use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app_config::AppConfig;
use crate::ConfigError;

fn default_api_service_name() -> String {
    "youtube".to_string()
}

fn default_api_version() -> String {
    "v3".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    /// Human-readable label used only in logs.
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelConfig {
    /// The label to show in logs: the configured name, else the channel ID.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsFile {
    #[serde(default = "default_api_service_name")]
    pub api_service_name: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub gcp_project_id: Option<String>,
    #[serde(default)]
    pub bq_dataset: Option<String>,
    pub channels: Vec<ChannelConfig>,
}

/// Destination project and dataset for the four output tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseTarget {
    pub project_id: String,
    pub dataset: String,
}

impl ChannelsFile {
    /// Channel IDs in configuration order.
    #[must_use]
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.id.clone()).collect()
    }

    /// Resolve the warehouse target, preferring env overrides over the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if neither source names a project
    /// or a dataset.
    pub fn warehouse_target(&self, config: &AppConfig) -> Result<WarehouseTarget, ConfigError> {
        let project_id = config
            .gcp_project_id
            .clone()
            .or_else(|| self.gcp_project_id.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "gcp_project_id must be set in the channels file or TUBELOAD_GCP_PROJECT_ID"
                        .to_string(),
                )
            })?;
        let dataset = config
            .bq_dataset
            .clone()
            .or_else(|| self.bq_dataset.clone())
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "bq_dataset must be set in the channels file or TUBELOAD_BQ_DATASET"
                        .to_string(),
                )
            })?;
        Ok(WarehouseTarget {
            project_id,
            dataset,
        })
    }
}

/// Load and validate the tracked-channel configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_channels(path: &Path) -> Result<ChannelsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ChannelsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let channels_file: ChannelsFile = serde_yaml::from_str(&content)?;

    validate_channels(&channels_file)?;

    Ok(channels_file)
}

fn validate_channels(channels_file: &ChannelsFile) -> Result<(), ConfigError> {
    if channels_file.channels.is_empty() {
        return Err(ConfigError::Validation(
            "at least one channel must be configured".to_string(),
        ));
    }

    if channels_file.api_service_name.trim().is_empty()
        || channels_file.api_version.trim().is_empty()
    {
        return Err(ConfigError::Validation(
            "api_service_name and api_version must be non-empty".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for channel in &channels_file.channels {
        let id = channel.id.trim();
        if id.is_empty() {
            return Err(ConfigError::Validation(
                "channel id must be non-empty".to_string(),
            ));
        }
        if id != channel.id {
            return Err(ConfigError::Validation(format!(
                "channel id '{}' has surrounding whitespace",
                channel.id
            )));
        }
        if !seen_ids.insert(id) {
            return Err(ConfigError::Validation(format!(
                "duplicate channel id: '{id}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ChannelsFile {
        serde_yaml::from_str(yaml).expect("yaml should parse")
    }

    fn test_config() -> AppConfig {
        AppConfig {
            youtube_api_key: "k".to_string(),
            credentials_path: None,
            channels_path: "./config/channels.yaml".into(),
            log_level: "info".to_string(),
            request_timeout_secs: 30,
            sentiment_url: "http://localhost:1".to_string(),
            question_url: "http://localhost:2".to_string(),
            gcp_project_id: None,
            bq_dataset: None,
        }
    }

    #[test]
    fn defaults_api_service_and_version() {
        let file = parse("channels:\n  - id: UC1\n");
        assert_eq!(file.api_service_name, "youtube");
        assert_eq!(file.api_version, "v3");
        assert!(validate_channels(&file).is_ok());
    }

    #[test]
    fn channel_ids_keep_configuration_order() {
        let file = parse("channels:\n  - id: UCb\n  - id: UCa\n    name: Alpha\n");
        assert_eq!(file.channel_ids(), vec!["UCb", "UCa"]);
        assert_eq!(file.channels[1].label(), "Alpha");
        assert_eq!(file.channels[0].label(), "UCb");
    }

    #[test]
    fn validate_rejects_empty_channel_list() {
        let file = parse("channels: []\n");
        let err = validate_channels(&file).unwrap_err();
        assert!(err.to_string().contains("at least one channel"));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let file = parse("channels:\n  - id: UC1\n  - id: UC1\n");
        let err = validate_channels(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate channel id"));
    }

    #[test]
    fn validate_rejects_blank_id() {
        let file = parse("channels:\n  - id: \"  \"\n");
        let err = validate_channels(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn warehouse_target_prefers_env_overrides() {
        let file = parse("gcp_project_id: from-file\nbq_dataset: file_ds\nchannels:\n  - id: UC1\n");
        let mut config = test_config();
        config.gcp_project_id = Some("from-env".to_string());
        let target = file.warehouse_target(&config).unwrap();
        assert_eq!(target.project_id, "from-env");
        assert_eq!(target.dataset, "file_ds");
    }

    #[test]
    fn warehouse_target_requires_dataset() {
        let file = parse("gcp_project_id: p\nchannels:\n  - id: UC1\n");
        let err = file.warehouse_target(&test_config()).unwrap_err();
        assert!(err.to_string().contains("bq_dataset"));
    }

    #[test]
    fn shipped_channels_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/channels.yaml");
        let file = load_channels(&path).expect("config/channels.yaml should load");
        assert!(!file.channels.is_empty());
        assert!(file.warehouse_target(&test_config()).is_ok());
    }

    #[test]
    fn load_channels_reports_missing_file() {
        let err = load_channels(Path::new("/nonexistent/tubeload/channels.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ChannelsFileIo { .. }));
    }
}
