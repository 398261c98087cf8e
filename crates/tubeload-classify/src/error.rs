use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier at {url} returned status {status}: {body}")]
    Server {
        url: String,
        status: u16,
        body: String,
    },

    #[error("classifier response parse error: {0}")]
    Parse(String),

    #[error("classifier returned {got} results for {expected} inputs")]
    LengthMismatch { expected: usize, got: usize },

    #[error("classifier returned no labels for input {index}")]
    EmptyPrediction { index: usize },

    #[error("unmapped question classifier label: {0}")]
    UnmappedLabel(String),
}
