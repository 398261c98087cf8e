//! Comment classification orchestration.

use tubeload_core::{Comment, CommentLabels};

use crate::error::ClassifyError;
use crate::labels::question_category_from_label;
use crate::preprocess::{truncate_words, MAX_WORDS};
use crate::types::{Classification, TextClassifier};

/// Label every comment with sentiment and question/statement results.
///
/// 1. Build the corpus: each comment's `text_display` truncated to
///    [`MAX_WORDS`] tokens, in table order.
/// 2. Run the sentiment classifier, then the question classifier, on the
///    same corpus.
/// 3. Write each pair of results into the comment the text came from.
///
/// Nothing is written unless both classifiers succeed for every comment.
///
/// # Errors
///
/// Returns [`ClassifyError::LengthMismatch`] if a classifier does not return
/// one result per comment, [`ClassifyError::UnmappedLabel`] for an unknown
/// question label, or any backend error.
pub async fn classify_comments<S, Q>(
    comments: &mut [Comment],
    sentiment: &S,
    question: &Q,
) -> Result<(), ClassifyError>
where
    S: TextClassifier,
    Q: TextClassifier,
{
    if comments.is_empty() {
        tracing::warn!("no comments to classify");
        return Ok(());
    }

    let corpus: Vec<String> = comments
        .iter()
        .map(|c| truncate_words(&c.text_display, MAX_WORDS))
        .collect();

    let sentiments = run_classifier(sentiment, &corpus).await?;
    let questions = run_classifier(question, &corpus).await?;

    let labels = sentiments
        .into_iter()
        .zip(questions)
        .map(|(s, q)| {
            Ok(CommentLabels {
                sentiment: s.label,
                sentiment_score: s.score,
                question_category: question_category_from_label(&q.label)?,
                question_score: q.score,
            })
        })
        .collect::<Result<Vec<_>, ClassifyError>>()?;

    for (comment, label) in comments.iter_mut().zip(labels) {
        comment.labels = Some(label);
    }

    Ok(())
}

async fn run_classifier<C: TextClassifier>(
    classifier: &C,
    corpus: &[String],
) -> Result<Vec<Classification>, ClassifyError> {
    let results = classifier.classify(corpus).await?;
    if results.len() != corpus.len() {
        return Err(ClassifyError::LengthMismatch {
            expected: corpus.len(),
            got: results.len(),
        });
    }
    tracing::info!(
        classifier = classifier.name(),
        texts = corpus.len(),
        "classification complete"
    );
    Ok(results)
}
