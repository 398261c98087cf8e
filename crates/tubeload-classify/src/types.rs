use crate::error::ClassifyError;

/// One label with its confidence, for one input text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// A single-label text classifier.
///
/// Implementations return exactly one [`Classification`] per input, in
/// input order. Any backend with that contract can be plugged into
/// [`crate::classify_comments`].
#[allow(async_fn_in_trait)]
pub trait TextClassifier {
    /// Short name used in logs, e.g. the model id.
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns [`ClassifyError`] if the backend fails or answers with a
    /// different number of results than inputs.
    async fn classify(&self, texts: &[String]) -> Result<Vec<Classification>, ClassifyError>;
}
