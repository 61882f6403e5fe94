//! Storage boundary
//!
//! Persistence of academic records belongs to an external collaborator; the
//! pipeline only depends on this trait. The one consistency requirement it
//! imposes is that `update_grading` lands grade and feedback together or
//! not at all.
//!
//! [`MemoryStorage`] is the in-process implementation used by the demo
//! binary and the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{Assignment, GradingUpdate, Submission};

/// Contract the pipeline requires from the persistence layer
#[async_trait]
pub trait Storage: Send + Sync {
    /// Loads one submission, `None` when it does not exist
    async fn load_submission(&self, id: i64) -> AppResult<Option<Submission>>;

    /// Loads one assignment, `None` when it does not exist
    async fn load_assignment(&self, id: i64) -> AppResult<Option<Assignment>>;

    /// Writes the grading result back. All-or-nothing: either every field of
    /// the update is applied or none is.
    async fn update_grading(&self, submission_id: i64, update: GradingUpdate) -> AppResult<()>;
}

#[derive(Default)]
struct Tables {
    submissions: HashMap<i64, Submission>,
    assignments: HashMap<i64, Assignment>,
}

/// In-memory storage. A single write lock around the tables makes every
/// update atomic with respect to concurrent readers.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_assignment(&self, assignment: Assignment) {
        let mut tables = self.tables.write().await;
        tables.assignments.insert(assignment.id, assignment);
    }

    /// Inserts a submission, enforcing the one-per-(assignment, learner)
    /// invariant
    pub async fn insert_submission(&self, submission: Submission) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.submissions.values().any(|existing| {
            existing.assignment_id == submission.assignment_id
                && existing.learner_id == submission.learner_id
        });
        if duplicate {
            return Err(AppError::duplicate_submission(
                submission.assignment_id,
                submission.learner_id,
            ));
        }
        tables.submissions.insert(submission.id, submission);
        Ok(())
    }

    /// Snapshot of one submission, for inspection after an evaluation run
    pub async fn submission(&self, id: i64) -> Option<Submission> {
        self.tables.read().await.submissions.get(&id).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_submission(&self, id: i64) -> AppResult<Option<Submission>> {
        Ok(self.tables.read().await.submissions.get(&id).cloned())
    }

    async fn load_assignment(&self, id: i64) -> AppResult<Option<Assignment>> {
        Ok(self.tables.read().await.assignments.get(&id).cloned())
    }

    async fn update_grading(&self, submission_id: i64, update: GradingUpdate) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let submission = tables
            .submissions
            .get_mut(&submission_id)
            .ok_or_else(|| AppError::submission_not_found(submission_id))?;

        if let Some(text) = update.extracted_text {
            submission.extracted_text = Some(text);
        }
        submission.grade = Some(update.grade);
        submission.feedback = Some(update.feedback);
        submission.grade_parsed = Some(update.grade_parsed);
        Ok(())
    }
}
