use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub youtube_api_key: String,
    /// Path to the Google service-account JSON used for the warehouse sink.
    /// Only optional so that dry runs work without warehouse credentials.
    pub credentials_path: Option<PathBuf>,
    pub channels_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub sentiment_url: String,
    pub question_url: String,
    pub gcp_project_id: Option<String>,
    pub bq_dataset: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("youtube_api_key", &"[redacted]")
            .field("credentials_path", &self.credentials_path)
            .field("channels_path", &self.channels_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("sentiment_url", &self.sentiment_url)
            .field("question_url", &self.question_url)
            .field("gcp_project_id", &self.gcp_project_id)
            .field("bq_dataset", &self.bq_dataset)
            .finish()
    }
}
