//! Raw label normalisation for the question-vs-statement model.

use tubeload_core::QuestionCategory;

use crate::error::ClassifyError;

/// Map the model's raw output label onto a [`QuestionCategory`].
///
/// `LABEL_0` is a statement and `LABEL_1` a question.
///
/// # Errors
///
/// Returns [`ClassifyError::UnmappedLabel`] for any other label.
pub fn question_category_from_label(raw: &str) -> Result<QuestionCategory, ClassifyError> {
    match raw {
        "LABEL_0" => Ok(QuestionCategory::Statement),
        "LABEL_1" => Ok(QuestionCategory::Question),
        other => Err(ClassifyError::UnmappedLabel(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_raw_model_labels() {
        assert_eq!(
            question_category_from_label("LABEL_0").unwrap(),
            QuestionCategory::Statement
        );
        assert_eq!(
            question_category_from_label("LABEL_1").unwrap(),
            QuestionCategory::Question
        );
    }

    #[test]
    fn rejects_unknown_labels() {
        for raw in ["LABEL_2", "label_0", "", "question"] {
            assert!(
                matches!(question_category_from_label(raw), Err(ClassifyError::UnmappedLabel(ref l)) if l == raw),
                "expected {raw:?} to be unmapped"
            );
        }
    }
}
