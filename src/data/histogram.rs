use std::io::Write;

use super::model::QuestionnaireDataset;
use crate::config::{AgeBins, MAX_AGE_BINS};
use crate::error::{AnalysisError, Result};

/// Widest bar drawn by [`AgeHistogram::render_text`].
const BAR_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// AgeHistogram
// ---------------------------------------------------------------------------

/// Participant counts per age bin.
///
/// Bins are half-open `[lo, hi)` except the last one, which also holds its
/// upper edge. Missing ages and ages outside the edges are not counted.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeHistogram {
    /// `counts[i]` is the number of ages in `[edges[i], edges[i + 1])`.
    pub counts: Vec<u64>,
    /// Bin edges, one more than there are bins.
    pub edges: Vec<f64>,
}

impl AgeHistogram {
    pub fn compute(dataset: &QuestionnaireDataset, bins: &AgeBins) -> Result<Self> {
        let edges = bins.edges().ok_or_else(|| AnalysisError::InvalidConfig {
            reason: format!("degenerate age bins {bins:?} (at most {MAX_AGE_BINS} bins)"),
        })?;
        Ok(Self::from_edges(dataset.rows.iter().filter_map(|r| r.age), edges))
    }

    fn from_edges(ages: impl Iterator<Item = f64>, edges: Vec<f64>) -> Self {
        let n_bins = edges.len() - 1;
        let (lo, hi) = (edges[0], edges[n_bins]);
        let mut counts = vec![0u64; n_bins];

        for age in ages {
            if !(lo..=hi).contains(&age) {
                continue;
            }
            // Index of the last edge <= age; the top edge folds into the last bin.
            let bin = (edges.partition_point(|&e| e <= age) - 1).min(n_bins - 1);
            counts[bin] += 1;
        }

        AgeHistogram { counts, edges }
    }

    /// Number of ages that landed in some bin.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(lo, hi, count)` for every bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| (w[0], w[1], c))
    }

    /// Closing bracket for bin `i`: `]` on the last bin, `)` elsewhere.
    fn close(&self, i: usize) -> char {
        if i + 1 == self.counts.len() {
            ']'
        } else {
            ')'
        }
    }

    /// Interval notation for bin `i`, e.g. `[10, 20)` or `[90, 100]`.
    ///
    /// Panics if `i` is not a bin index.
    pub fn bin_label(&self, i: usize) -> String {
        let (lo, hi) = (self.edges[i], self.edges[i + 1]);
        format!("[{lo}, {hi}{}", self.close(i))
    }

    /// Draw the histogram as a horizontal text bar chart.
    pub fn render_text<W: Write>(&self, out: &mut W) -> Result<()> {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        writeln!(out, "Age distribution ({} participants)", self.total())?;
        for (i, (lo, hi, count)) in self.bins().enumerate() {
            let width = if max == 0 {
                0
            } else {
                (count as usize * BAR_WIDTH).div_ceil(max as usize)
            };
            let close = self.close(i);
            writeln!(
                out,
                "[{lo:>5}, {hi:>5}{close} | {:<BAR_WIDTH$} {count}",
                "#".repeat(width)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Response, N_QUESTIONS};

    fn with_ages(ages: &[Option<f64>]) -> QuestionnaireDataset {
        QuestionnaireDataset::from_rows(
            ages.iter()
                .map(|&age| Response::new(age, "F", "a@b.com", [Some(1.0); N_QUESTIONS]))
                .collect(),
        )
    }

    #[test]
    fn counts_per_decade() {
        let ds = with_ages(&[Some(5.0), Some(15.0), Some(15.0), Some(105.0)]);
        let hist = AgeHistogram::compute(&ds, &AgeBins::default()).unwrap();

        assert_eq!(hist.counts, vec![1, 2, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(hist.edges.len(), 11);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn missing_ages_are_skipped() {
        let ds = with_ages(&[None, Some(42.0), None]);
        let hist = AgeHistogram::compute(&ds, &AgeBins::default()).unwrap();
        assert_eq!(hist.total(), 1);
        assert_eq!(hist.counts[4], 1);
    }

    #[test]
    fn edges_follow_half_open_bins() {
        let ds = with_ages(&[Some(0.0), Some(10.0), Some(99.9), Some(100.0), Some(100.5)]);
        let hist = AgeHistogram::compute(&ds, &AgeBins::default()).unwrap();

        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[1], 1);
        // the upper edge belongs to the last bin
        assert_eq!(hist.counts[9], 2);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn degenerate_bins_are_a_config_error() {
        let bins = AgeBins {
            start: 0.0,
            stop: 100.0,
            width: -1.0,
        };
        let err = AgeHistogram::compute(&with_ages(&[Some(5.0)]), &bins).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig { .. }));
    }

    #[test]
    fn too_many_bins_are_a_config_error() {
        let bins = AgeBins {
            start: 0.0,
            stop: 1e12,
            width: 1.0,
        };
        let err = AgeHistogram::compute(&with_ages(&[Some(5.0)]), &bins).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig { .. }));
    }

    #[test]
    fn only_the_last_label_is_closed() {
        let hist = AgeHistogram::compute(&with_ages(&[]), &AgeBins::default()).unwrap();

        assert_eq!(hist.bin_label(0), "[0, 10)");
        assert_eq!(hist.bin_label(8), "[80, 90)");
        assert_eq!(hist.bin_label(9), "[90, 100]");
    }

    #[test]
    fn text_rendering_lists_every_bin() {
        let ds = with_ages(&[Some(5.0), Some(15.0), Some(15.0)]);
        let hist = AgeHistogram::compute(&ds, &AgeBins::default()).unwrap();

        let mut out = Vec::new();
        hist.render_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Age distribution (3 participants)"));
        assert_eq!(text.lines().count(), 11);
        assert!(text.contains(&"#".repeat(BAR_WIDTH)));
        let last = text.lines().last().unwrap();
        assert!(last.starts_with("[   90,   100]"));
        assert!(last.ends_with(" 0"));
    }
}
