use std::fmt;

/// Number of questions every participant was asked.
pub const N_QUESTIONS: usize = 5;

/// Source column names of the answers, in answer order.
pub const QUESTION_COLUMNS: [&str; N_QUESTIONS] = ["q1", "q2", "q3", "q4", "q5"];

/// One participant's answers; `None` marks a question left unanswered.
pub type Answers = [Option<f64>; N_QUESTIONS];

// ---------------------------------------------------------------------------
// Response – one row of the questionnaire table
// ---------------------------------------------------------------------------

/// A single questionnaire submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub age: Option<f64>,
    pub gender: String,
    /// Raw email as found in the source; `None` when it was null or absent.
    pub email: Option<String>,
    pub answers: Answers,
    /// Derived by the scorer; stays `None` until scoring ran.
    pub score: Option<u8>,
}

impl Response {
    pub fn new(age: Option<f64>, gender: &str, email: &str, answers: Answers) -> Self {
        Response {
            age,
            gender: gender.to_string(),
            email: Some(email.to_string()),
            answers,
            score: None,
        }
    }

    /// Number of unanswered questions.
    pub fn missing_answers(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }

    /// Mean of the answered questions, `None` when nothing was answered.
    pub fn mean_of_present(&self) -> Option<f64> {
        let present: Vec<f64> = self.answers.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let age = self
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "<null>".into());
        let email = self.email.as_deref().unwrap_or("<null>");
        write!(f, "{} / {age} / {email} /", self.gender)?;
        for answer in &self.answers {
            match answer {
                Some(v) => write!(f, " {v:.2}")?,
                None => write!(f, " <null>")?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// QuestionnaireDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full table of responses. A row's ordinal is its position in `rows`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionnaireDataset {
    pub rows: Vec<Response>,
    /// Whether the `score` column has been computed.
    pub has_scores: bool,
}

impl QuestionnaireDataset {
    pub fn from_rows(rows: Vec<Response>) -> Self {
        QuestionnaireDataset {
            rows,
            has_scores: false,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `score` column, or `None` if scoring has not run yet.
    pub fn scores(&self) -> Option<Vec<Option<u8>>> {
        self.has_scores
            .then(|| self.rows.iter().map(|r| r.score).collect())
    }

    /// Sorted, de-duplicated gender labels present in the table.
    pub fn genders(&self) -> Vec<String> {
        let mut genders: Vec<String> = self.rows.iter().map(|r| r.gender.clone()).collect();
        genders.sort();
        genders.dedup();
        genders
    }
}
