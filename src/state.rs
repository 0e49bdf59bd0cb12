use std::path::Path;

use anyhow::{Context, Result};
use rusty_survey::data::export::save_json;
use rusty_survey::{AgeHistogram, AnalysisConfig, CohortTable, QuestionnaireAnalysis};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Open analysis session (None until user loads a file).
    pub session: Option<QuestionnaireAnalysis>,

    /// Pipeline settings edited in the side panel.
    pub config: AnalysisConfig,

    /// Ordinals touched by the last imputation.
    pub imputed_rows: Vec<usize>,

    /// Derived views, rebuilt after every pipeline step.
    pub histogram: Option<AgeHistogram>,
    pub cohorts: Option<CohortTable>,

    /// Colour per gender.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Open and parse a source file, replacing the current session.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let mut session = QuestionnaireAnalysis::with_config(path, self.config.clone())
            .with_context(|| format!("opening {}", path.display()))?;
        session.read_data().context("reading questionnaire data")?;

        self.session = Some(session);
        self.imputed_rows.clear();
        self.refresh()
    }

    /// Replace the table with the rows whose email is well-formed.
    pub fn remove_invalid_emails(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        session.data = session
            .remove_rows_without_mail()
            .context("validating emails")?;
        // Ordinals changed, earlier imputation indices no longer apply.
        self.imputed_rows.clear();
        self.refresh()
    }

    pub fn fill_missing(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        let (_, touched) = session.fill_na_with_mean().context("imputing answers")?;
        self.imputed_rows = touched;
        self.refresh()
    }

    pub fn score(&mut self) -> Result<()> {
        self.session_mut()?
            .score_subjects()
            .context("scoring subjects")?;
        self.refresh()
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        let session = self.session.as_ref().context("no dataset loaded")?;
        save_json(&session.data, path).with_context(|| format!("exporting to {}", path.display()))
    }

    /// Push edited settings into the session and rebuild the derived views.
    pub fn apply_config(&mut self) -> Result<()> {
        if let Some(session) = &mut self.session {
            session.config = self.config.clone();
        }
        self.refresh()
    }

    /// Record the outcome of a pipeline step in the status line.
    pub fn report(&mut self, step: &str, result: Result<()>) {
        match result {
            Ok(()) => {
                let rows = self.session.as_ref().map_or(0, |s| s.data.len());
                log::info!("{step}: done ({rows} rows)");
                self.status_message = None;
            }
            Err(e) => {
                log::error!("{step} failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute histogram, cohort table and colours from the current table.
    fn refresh(&mut self) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        self.histogram = Some(session.age_histogram().context("binning ages")?);
        self.cohorts = Some(session.correlate_gender_age());
        self.color_map = Some(ColorMap::new(&session.data.genders()));
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut QuestionnaireAnalysis> {
        self.session.as_mut().context("no dataset loaded")
    }
}
