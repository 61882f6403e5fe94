//! Assignment metadata, read-only to the pipeline

use chrono::{DateTime, Utc};

/// Grading context for a submission. Immutable from the pipeline's
/// perspective; it only supplies the prompt with its title, brief and
/// optional constraints.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    /// Free-text brief / rubric shown to the evaluator
    pub description: String,
    /// When set, the solution must be code in this language
    pub programming_language: Option<String>,
    /// Optional structured criteria the evaluator must weigh
    pub evaluation_criteria: Option<String>,
    pub due_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates an assignment with only the mandatory fields
    pub fn new(id: i64, title: impl Into<String>, description: impl Into<String>, due_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            programming_language: None,
            evaluation_criteria: None,
            due_at,
        }
    }
}
