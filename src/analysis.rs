use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::data::cohort::{correlate_gender_age, CohortTable};
use crate::data::filter::remove_rows_without_mail;
use crate::data::histogram::AgeHistogram;
use crate::data::impute::fill_na_with_mean;
use crate::data::loader::load_file;
use crate::data::model::QuestionnaireDataset;
use crate::data::score::score_subjects;
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// QuestionnaireAnalysis – one analysis session over one source file
// ---------------------------------------------------------------------------

/// Reads and analyses the data produced by the questionnaire experiment.
///
/// Construction only checks that the source exists; [`read_data`] does the
/// parsing. Until then the session holds an empty table.
///
/// [`read_data`]: QuestionnaireAnalysis::read_data
#[derive(Debug, Clone)]
pub struct QuestionnaireAnalysis {
    data_fname: PathBuf,
    pub config: AnalysisConfig,
    pub data: QuestionnaireDataset,
}

impl QuestionnaireAnalysis {
    /// Accepts anything path-like (`&str`, `String`, `&Path`, `PathBuf`).
    pub fn new(data_fname: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(data_fname, AnalysisConfig::default())
    }

    pub fn with_config(data_fname: impl AsRef<Path>, config: AnalysisConfig) -> Result<Self> {
        let path = data_fname.as_ref();
        if !path.exists() {
            return Err(AnalysisError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            data_fname: path.to_path_buf(),
            config,
            data: QuestionnaireDataset::default(),
        })
    }

    pub fn data_fname(&self) -> &Path {
        &self.data_fname
    }

    /// Parse the source file into [`Self::data`], replacing what was there.
    pub fn read_data(&mut self) -> Result<&QuestionnaireDataset> {
        self.data = load_file(&self.data_fname)?;
        Ok(&self.data)
    }

    /// Age counts over the configured bins.
    pub fn age_histogram(&self) -> Result<AgeHistogram> {
        AgeHistogram::compute(&self.data, &self.config.age_bins)
    }

    /// Compute the age histogram and draw it into `out`.
    pub fn show_age_distrib<W: Write>(&self, out: &mut W) -> Result<AgeHistogram> {
        let hist = self.age_histogram()?;
        hist.render_text(out)?;
        Ok(hist)
    }

    /// A copy of the data without rows whose email is malformed.
    pub fn remove_rows_without_mail(&self) -> Result<QuestionnaireDataset> {
        remove_rows_without_mail(&self.data)
    }

    /// Fill missing answers with each row's own mean.
    ///
    /// Returns the updated table and the ordinals of the rows that changed.
    pub fn fill_na_with_mean(&mut self) -> Result<(&QuestionnaireDataset, Vec<usize>)> {
        let touched = fill_na_with_mean(&mut self.data)?;
        Ok((&self.data, touched))
    }

    /// Add the score column using the configured tolerance.
    pub fn score_subjects(&mut self) -> Result<&QuestionnaireDataset> {
        let tolerance = self.config.maximal_nans_per_sub;
        self.score_subjects_with(tolerance)
    }

    pub fn score_subjects_with(&mut self, maximal_nans_per_sub: usize) -> Result<&QuestionnaireDataset> {
        score_subjects(&mut self.data, maximal_nans_per_sub)?;
        Ok(&self.data)
    }

    /// Mean answers per (gender, age above the configured threshold).
    pub fn correlate_gender_age(&self) -> CohortTable {
        correlate_gender_age(&self.data, self.config.age_threshold)
    }
}
