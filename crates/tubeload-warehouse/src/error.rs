use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read credentials file {path}: {source}")]
    CredentialsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    #[error("failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: u16, body: String },

    #[error("BigQuery API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize rows: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("schema mismatch in {table} row {row}: {reason}")]
    SchemaMismatch {
        table: String,
        row: usize,
        reason: String,
    },

    #[error("load job {job_id} for {table} failed ({reason}): {message}")]
    Job {
        table: String,
        job_id: String,
        reason: String,
        message: String,
    },

    #[error("load job {job_id} for {table} not done after {polls} polls")]
    JobTimeout {
        table: String,
        job_id: String,
        polls: u32,
    },

    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
