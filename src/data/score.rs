use super::model::{QuestionnaireDataset, Response};
use crate::error::{AnalysisError, Result};

/// Compute the `score` column in place.
///
/// A subject with more than `maximal_nans_per_sub` missing answers gets no
/// score. Otherwise the score is the mean of the answered questions, rounded
/// down. A subject that answered nothing has no mean and gets no score either,
/// whatever the tolerance.
///
/// Scores are computed for every row before any is written; a floored mean
/// outside `0..=255` fails with [`AnalysisError::ScoreOutOfRange`].
pub fn score_subjects(dataset: &mut QuestionnaireDataset, maximal_nans_per_sub: usize) -> Result<()> {
    let scores = dataset
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| score_row(i, row, maximal_nans_per_sub))
        .collect::<Result<Vec<Option<u8>>>>()?;

    let unscored = scores.iter().filter(|s| s.is_none()).count();
    for (row, score) in dataset.rows.iter_mut().zip(scores) {
        row.score = score;
    }
    dataset.has_scores = true;

    log::info!(
        "Scored {} rows ({} left without a score, tolerance {})",
        dataset.len(),
        unscored,
        maximal_nans_per_sub
    );
    Ok(())
}

fn score_row(i: usize, row: &Response, maximal_nans_per_sub: usize) -> Result<Option<u8>> {
    if row.missing_answers() > maximal_nans_per_sub {
        return Ok(None);
    }
    let Some(mean) = row.mean_of_present() else {
        return Ok(None);
    };
    let floored = mean.floor();
    if !(0.0..=f64::from(u8::MAX)).contains(&floored) {
        return Err(AnalysisError::ScoreOutOfRange {
            row: i,
            value: floored,
        });
    }
    Ok(Some(floored as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::N_QUESTIONS;

    fn dataset(rows: &[[Option<f64>; N_QUESTIONS]]) -> QuestionnaireDataset {
        QuestionnaireDataset::from_rows(
            rows.iter()
                .map(|a| Response::new(Some(30.0), "F", "a@b.com", *a))
                .collect(),
        )
    }

    #[test]
    fn too_many_missing_answers_leave_score_empty() {
        let mut ds = dataset(&[[Some(70.0), Some(80.0), Some(90.0), None, None]]);
        score_subjects(&mut ds, 1).unwrap();
        assert_eq!(ds.scores(), Some(vec![None]));
    }

    #[test]
    fn score_is_floored_mean_of_present_answers() {
        let mut ds = dataset(&[
            [Some(70.0), Some(80.0), Some(90.0), Some(85.0), None],
            [Some(79.0), Some(80.0), Some(80.0), Some(80.0), Some(80.5)],
        ]);
        score_subjects(&mut ds, 1).unwrap();
        // 81.25 -> 81, 79.9 -> 79
        assert_eq!(ds.scores(), Some(vec![Some(81), Some(79)]));
    }

    #[test]
    fn tolerance_is_inclusive() {
        let mut ds = dataset(&[[Some(10.0), Some(20.0), None, None, None]]);
        score_subjects(&mut ds, 3).unwrap();
        assert_eq!(ds.scores(), Some(vec![Some(15)]));

        score_subjects(&mut ds, 2).unwrap();
        assert_eq!(ds.scores(), Some(vec![None]));
    }

    #[test]
    fn unanswered_row_has_no_score_even_with_full_tolerance() {
        let mut ds = dataset(&[[None; N_QUESTIONS]]);
        score_subjects(&mut ds, N_QUESTIONS).unwrap();
        assert_eq!(ds.scores(), Some(vec![None]));
    }

    #[test]
    fn rescoring_is_idempotent() {
        let mut ds = dataset(&[
            [Some(70.0), Some(80.0), Some(90.0), Some(85.0), None],
            [Some(70.0), None, None, Some(85.0), None],
        ]);
        score_subjects(&mut ds, 1).unwrap();
        let first = ds.scores();
        score_subjects(&mut ds, 1).unwrap();
        assert_eq!(ds.scores(), first);
    }

    #[test]
    fn out_of_range_score_fails_loudly() {
        let mut ds = dataset(&[
            [Some(50.0); N_QUESTIONS],
            [Some(300.0), Some(300.0), Some(300.0), Some(300.0), Some(300.0)],
        ]);
        let err = score_subjects(&mut ds, 1).unwrap_err();

        assert!(matches!(err, AnalysisError::ScoreOutOfRange { row: 1, .. }));
        assert!(!ds.has_scores);
        assert_eq!(ds.rows[0].score, None);
    }

    #[test]
    fn negative_mean_is_out_of_range() {
        let mut ds = dataset(&[[Some(-0.5); N_QUESTIONS]]);
        assert!(matches!(
            score_subjects(&mut ds, 1),
            Err(AnalysisError::ScoreOutOfRange { row: 0, .. })
        ));
    }
}
