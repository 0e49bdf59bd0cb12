//! Cleaning and cohort statistics for a questionnaire experiment.
//!
//! The pipeline is a handful of independent steps over one in-memory table:
//! load, drop rows with malformed emails, impute missing answers, score each
//! subject, then look at the age distribution and at mean answers per
//! (gender, age bracket). [`QuestionnaireAnalysis`] bundles them around a
//! single source file; the functions in [`data`] work on any table.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;

pub use analysis::QuestionnaireAnalysis;
pub use config::{AgeBins, AnalysisConfig};
pub use data::cohort::{CohortKey, CohortRow, CohortTable};
pub use data::histogram::AgeHistogram;
pub use data::model::{QuestionnaireDataset, Response, N_QUESTIONS, QUESTION_COLUMNS};
pub use error::{AnalysisError, Result};
