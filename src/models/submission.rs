//! A learner's attempt at an assignment

use chrono::{DateTime, Utc};

/// Raw submitted image, as received from the upload boundary
#[derive(Clone, Debug)]
pub struct SubmissionImage {
    /// Image bytes
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `image/png`
    pub media_type: String,
    /// Original filename
    pub filename: String,
}

/// A learner's single attempt at an assignment.
///
/// At most one submission exists per (assignment, learner) pair; the storage
/// collaborator enforces that on insert. `extracted_text`, `grade` and
/// `feedback` stay `None` until the pipeline runs, and each evaluation run
/// overwrites them idempotently.
#[derive(Clone, Debug)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub learner_id: i64,
    /// Raw image, present until (and after) OCR extracts its text
    pub image: Option<SubmissionImage>,
    /// OCR output; set once the pipeline has run
    pub extracted_text: Option<String>,
    /// Grade in [0, 10]; set once the pipeline has run
    pub grade: Option<f64>,
    /// Evaluator feedback; set once the pipeline has run
    pub feedback: Option<String>,
    /// Whether the stored grade came from a successfully parsed marker.
    /// Distinguishes a genuine zero from the parse-failure fallback.
    pub grade_parsed: Option<bool>,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Creates a fresh, unevaluated submission
    pub fn new(id: i64, assignment_id: i64, learner_id: i64, image: Option<SubmissionImage>) -> Self {
        Self {
            id,
            assignment_id,
            learner_id,
            image,
            extracted_text: None,
            grade: None,
            feedback: None,
            grade_parsed: None,
            submitted_at: Utc::now(),
        }
    }

    /// Creates a submission that already carries extracted text
    /// (e.g. the learner typed the solution instead of photographing it)
    pub fn with_text(id: i64, assignment_id: i64, learner_id: i64, text: impl Into<String>) -> Self {
        let mut submission = Self::new(id, assignment_id, learner_id, None);
        submission.extracted_text = Some(text.into());
        submission
    }
}
