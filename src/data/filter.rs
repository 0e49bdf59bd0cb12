use super::model::QuestionnaireDataset;
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Email predicate
// ---------------------------------------------------------------------------

/// Structural email check.
///
/// An address passes when all of these hold:
/// * it does not start or end with `@`
/// * it contains exactly one `@`
/// * it does not start or end with `.`
/// * it does not contain `@.`
/// * it contains at least one `.`
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('@')
        && !email.ends_with('@')
        && email.matches('@').count() == 1
        && !email.starts_with('.')
        && !email.ends_with('.')
        && !email.contains("@.")
        && email.contains('.')
}

// ---------------------------------------------------------------------------
// Row filter
// ---------------------------------------------------------------------------

/// Return a copy of `dataset` holding only rows with a valid email.
///
/// Surviving rows keep their relative order and are renumbered from 0.
/// A row without an email string aborts the whole operation with
/// [`AnalysisError::InvalidRow`].
pub fn remove_rows_without_mail(dataset: &QuestionnaireDataset) -> Result<QuestionnaireDataset> {
    let mut kept = Vec::with_capacity(dataset.len());

    for (i, row) in dataset.rows.iter().enumerate() {
        let Some(email) = row.email.as_deref() else {
            return Err(AnalysisError::InvalidRow {
                row: i,
                reason: "email is missing or not a string".into(),
            });
        };
        if is_valid_email(email) {
            kept.push(row.clone());
        } else {
            log::debug!("Dropping row {i}: invalid email {email:?}");
        }
    }

    log::info!(
        "Email filter kept {} of {} rows",
        kept.len(),
        dataset.len()
    );

    Ok(QuestionnaireDataset {
        rows: kept,
        has_scores: dataset.has_scores,
    })
}
