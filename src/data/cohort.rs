use std::collections::BTreeMap;
use std::fmt;

use super::model::{QuestionnaireDataset, N_QUESTIONS, QUESTION_COLUMNS};

// ---------------------------------------------------------------------------
// CohortKey – (gender, age bracket)
// ---------------------------------------------------------------------------

/// Grouping key of the cohort table. Orders by gender, then bracket with
/// `false` first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CohortKey {
    pub gender: String,
    /// Whether the members are older than the age threshold.
    pub above_threshold: bool,
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.gender, self.above_threshold)
    }
}

/// Per-question means of one cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortRow {
    pub key: CohortKey,
    /// `None` when no member answered that question.
    pub means: [Option<f64>; N_QUESTIONS],
    pub members: usize,
}

/// Mean answers indexed by (gender, age bracket), one row per observed key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortTable {
    pub age_threshold: f64,
    pub rows: Vec<CohortRow>,
}

impl CohortTable {
    pub fn get(&self, gender: &str, above_threshold: bool) -> Option<&CohortRow> {
        self.rows
            .iter()
            .find(|r| r.key.gender == gender && r.key.above_threshold == above_threshold)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for CohortTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8} {:<6}", "gender", format!(">{}", self.age_threshold))?;
        for col in QUESTION_COLUMNS {
            write!(f, " {col:>8}")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<8} {:<6}", row.key.gender, row.key.above_threshold)?;
            for mean in &row.means {
                match mean {
                    Some(v) => write!(f, " {v:>8.3}")?,
                    None => write!(f, " {:>8}", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Accumulator {
    sums: [f64; N_QUESTIONS],
    counts: [usize; N_QUESTIONS],
    members: usize,
}

/// Group rows with a known age by gender and by `age > age_threshold`, and
/// average every question within each group.
///
/// Missing answers are skipped, not counted as zero. The derived score is not
/// aggregated.
pub fn correlate_gender_age(dataset: &QuestionnaireDataset, age_threshold: f64) -> CohortTable {
    let mut groups: BTreeMap<CohortKey, Accumulator> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in &dataset.rows {
        let Some(age) = row.age else {
            skipped += 1;
            continue;
        };
        let key = CohortKey {
            gender: row.gender.clone(),
            above_threshold: age > age_threshold,
        };
        let acc = groups.entry(key).or_default();
        acc.members += 1;
        for (j, answer) in row.answers.iter().enumerate() {
            if let Some(v) = answer {
                acc.sums[j] += v;
                acc.counts[j] += 1;
            }
        }
    }

    if skipped > 0 {
        log::debug!("Cohort aggregation skipped {skipped} rows without an age");
    }

    let rows: Vec<CohortRow> = groups
        .into_iter()
        .map(|(key, acc)| {
            let mut means = [None; N_QUESTIONS];
            for (j, mean) in means.iter_mut().enumerate() {
                if acc.counts[j] > 0 {
                    *mean = Some(acc.sums[j] / acc.counts[j] as f64);
                }
            }
            CohortRow {
                key,
                means,
                members: acc.members,
            }
        })
        .collect();

    log::info!("Found {} cohorts above/below age {age_threshold}", rows.len());

    CohortTable {
        age_threshold,
        rows,
    }
}
