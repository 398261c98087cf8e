//! Comment classification for tubeload.
//!
//! Runs two independent text classifiers (sentiment, and question vs.
//! statement) over the truncated comment corpus and attaches the results to
//! each [`tubeload_core::Comment`].

pub mod error;
pub mod labels;
pub mod pipeline;
pub mod preprocess;
pub mod tei;
pub mod types;

pub use error::ClassifyError;
pub use labels::question_category_from_label;
pub use pipeline::classify_comments;
pub use preprocess::{truncate_words, MAX_WORDS};
pub use tei::TeiClassifier;
pub use types::{Classification, TextClassifier};
