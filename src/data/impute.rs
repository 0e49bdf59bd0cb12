use super::model::QuestionnaireDataset;
use crate::error::{AnalysisError, Result};

/// Fill every missing answer with the mean of the answers present in the
/// same row.
///
/// Returns the ordinals of the rows that were modified, in row order. The
/// fills are planned before anything is written, so a row with no answers at
/// all fails with [`AnalysisError::UndefinedImputation`] and leaves the
/// table untouched.
pub fn fill_na_with_mean(dataset: &mut QuestionnaireDataset) -> Result<Vec<usize>> {
    let mut plan: Vec<(usize, f64)> = Vec::new();

    for (i, row) in dataset.rows.iter().enumerate() {
        if row.missing_answers() == 0 {
            continue;
        }
        let fill = row
            .mean_of_present()
            .ok_or(AnalysisError::UndefinedImputation { row: i })?;
        plan.push((i, fill));
    }

    for &(i, fill) in &plan {
        let row = &mut dataset.rows[i];
        for answer in row.answers.iter_mut().filter(|a| a.is_none()) {
            *answer = Some(fill);
        }
        log::debug!("Row {i}: filled missing answers with {fill:.3}");
    }

    log::info!("Imputed missing answers in {} rows", plan.len());
    Ok(plan.into_iter().map(|(i, _)| i).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Response, N_QUESTIONS};

    fn row(answers: [Option<f64>; N_QUESTIONS]) -> Response {
        Response::new(Some(30.0), "F", "a@b.com", answers)
    }

    #[test]
    fn fills_with_row_mean() {
        let mut ds = QuestionnaireDataset::from_rows(vec![
            row([Some(1.0); N_QUESTIONS]),
            row([Some(10.0), None, Some(30.0), None, Some(50.0)]),
        ]);

        let touched = fill_na_with_mean(&mut ds).unwrap();

        assert_eq!(touched, vec![1]);
        assert_eq!(
            ds.rows[1].answers,
            [Some(10.0), Some(30.0), Some(30.0), Some(30.0), Some(50.0)]
        );
        assert_eq!(ds.rows[0].answers, [Some(1.0); N_QUESTIONS]);
    }

    #[test]
    fn each_row_uses_its_own_mean() {
        let mut ds = QuestionnaireDataset::from_rows(vec![
            row([None, Some(2.0), Some(4.0), Some(6.0), Some(8.0)]),
            row([Some(90.0), Some(100.0), None, None, None]),
        ]);

        let touched = fill_na_with_mean(&mut ds).unwrap();

        assert_eq!(touched, vec![0, 1]);
        assert_eq!(ds.rows[0].answers[0], Some(5.0));
        assert_eq!(ds.rows[1].answers[2..], [Some(95.0); 3]);
    }

    #[test]
    fn unanswered_row_is_rejected_without_side_effects() {
        let mut ds = QuestionnaireDataset::from_rows(vec![
            row([Some(10.0), None, Some(30.0), None, Some(50.0)]),
            row([None; N_QUESTIONS]),
        ]);
        let before = ds.clone();

        let err = fill_na_with_mean(&mut ds).unwrap_err();

        assert!(matches!(err, AnalysisError::UndefinedImputation { row: 1 }));
        assert_eq!(ds, before);
    }

    #[test]
    fn identity_columns_are_not_touched() {
        let mut ds = QuestionnaireDataset::from_rows(vec![Response {
            age: None,
            gender: "M".into(),
            email: None,
            answers: [Some(4.0), None, None, None, None],
            score: None,
        }]);

        fill_na_with_mean(&mut ds).unwrap();

        assert_eq!(ds.rows[0].age, None);
        assert_eq!(ds.rows[0].email, None);
        assert_eq!(ds.rows[0].answers, [Some(4.0); N_QUESTIONS]);
    }
}
