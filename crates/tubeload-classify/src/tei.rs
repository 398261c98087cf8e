//! TEI (Text Embeddings Inference) client for sequence classification.
//!
//! TEI serves classification models behind `POST /predict`. A batch request
//! wraps each text in its own single-element array (a flat two-element list
//! would be read as a sentence pair) and the response carries every label
//! with its score for each input.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::types::{Classification, TextClassifier};

/// Maximum number of texts per /predict call (TEI's default client batch limit).
const BATCH_SIZE: usize = 32;

/// TEI HTTP classifier.
pub struct TeiClassifier {
    client: reqwest::Client,
    name: String,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: Vec<[&'a str; 1]>,
    truncate: bool,
    raw_scores: bool,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

impl TeiClassifier {
    /// Create a classifier for the TEI server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(name: &str, base_url: &str, timeout_secs: u64) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            name: name.to_string(),
            url: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }

    async fn predict_batch(&self, chunk: &[String]) -> Result<Vec<Classification>, ClassifyError> {
        let request = PredictRequest {
            inputs: chunk.iter().map(|t| [t.as_str()]).collect(),
            truncate: true,
            raw_scores: false,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Server {
                url: self.url.clone(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let predictions: Vec<Vec<Prediction>> = response
            .json()
            .await
            .map_err(|e| ClassifyError::Parse(format!("{}: {e}", self.name)))?;

        if predictions.len() != chunk.len() {
            return Err(ClassifyError::LengthMismatch {
                expected: chunk.len(),
                got: predictions.len(),
            });
        }

        predictions
            .into_iter()
            .enumerate()
            .map(|(index, labels)| {
                labels
                    .into_iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score))
                    .map(|top| Classification {
                        label: top.label,
                        score: top.score,
                    })
                    .ok_or(ClassifyError::EmptyPrediction { index })
            })
            .collect()
    }
}

impl TextClassifier for TeiClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    /// Classify texts in batches of [`BATCH_SIZE`], preserving input order.
    async fn classify(&self, texts: &[String]) -> Result<Vec<Classification>, ClassifyError> {
        let mut results = Vec::with_capacity(texts.len());

        for (batch_idx, chunk) in texts.chunks(BATCH_SIZE).enumerate() {
            tracing::debug!(
                classifier = %self.name,
                batch = batch_idx,
                size = chunk.len(),
                "classifying batch"
            );
            results.extend(self.predict_batch(chunk).await?);
        }

        Ok(results)
    }
}
