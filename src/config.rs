use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AgeBins – fixed-width histogram layout
// ---------------------------------------------------------------------------

/// Most bins an [`AgeBins`] layout may produce.
pub const MAX_AGE_BINS: usize = 10_000;

/// Fixed-width bin layout for the age histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBins {
    pub start: f64,
    pub stop: f64,
    pub width: f64,
}

impl Default for AgeBins {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 100.0,
            width: 10.0,
        }
    }
}

impl AgeBins {
    /// Bin edges from `start` to `stop` inclusive.
    ///
    /// Returns `None` for a degenerate layout: non-positive width, empty
    /// range, non-finite bounds, or more than [`MAX_AGE_BINS`] bins.
    pub fn edges(&self) -> Option<Vec<f64>> {
        let finite = self.start.is_finite() && self.stop.is_finite() && self.width.is_finite();
        if !finite || self.width <= 0.0 || self.stop <= self.start {
            return None;
        }
        let n_bins = ((self.stop - self.start) / self.width).ceil();
        if n_bins > MAX_AGE_BINS as f64 {
            return None;
        }
        let n_bins = n_bins as usize;
        // Computed from the index so edges do not accumulate rounding error.
        let mut edges: Vec<f64> = (0..n_bins)
            .map(|i| self.start + i as f64 * self.width)
            .collect();
        edges.push(self.stop);
        Some(edges)
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Tunables for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum number of missing answers a subject may have and still be scored.
    pub maximal_nans_per_sub: usize,
    /// Subjects strictly older than this fall into the upper age bracket.
    pub age_threshold: f64,
    pub age_bins: AgeBins,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            maximal_nans_per_sub: 1,
            age_threshold: 40.0,
            age_bins: AgeBins::default(),
        }
    }
}
