//! The evaluation pipeline controller
//!
//! Per submission, the run walks a fixed sequence of stages:
//!
//! ```text
//! LOADED -> OCR_PENDING -> OCR_DONE -> PROMPT_BUILT -> EVAL_PENDING
//!        -> EVAL_DONE -> PERSISTED
//! ```
//!
//! with failure possible at every stage. Everything before the final
//! persistence handoff is pure computation or a stateless network call, so
//! a failed run leaves the submission untouched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{EvaluationOutcome, GradingRequest, GradingUpdate};
use crate::providers::{ProviderRegistry, ProviderResolver};
use crate::services::{build_prompt, sanitize_text};
use crate::storage::Storage;

/// Drives one submission through OCR, evaluation and persistence
pub struct EvaluationOrchestrator {
    resolver: Arc<dyn ProviderResolver>,
    storage: Arc<dyn Storage>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl EvaluationOrchestrator {
    /// Production constructor: providers come from the registry, retry
    /// budgets from its configuration.
    pub fn new(registry: ProviderRegistry, storage: Arc<dyn Storage>) -> Self {
        let max_retries = registry.config().max_retries;
        let retry_backoff = Duration::from_millis(registry.config().retry_backoff_ms);
        Self {
            resolver: Arc::new(registry),
            storage,
            max_retries,
            retry_backoff,
        }
    }

    /// Constructor with an explicit resolver, for callers (and tests) that
    /// substitute their own providers.
    pub fn with_resolver(
        resolver: Arc<dyn ProviderResolver>,
        storage: Arc<dyn Storage>,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            resolver,
            storage,
            max_retries,
            retry_backoff,
        }
    }

    /// Evaluates one submission end to end and persists the result.
    ///
    /// Re-running on a submission whose text is already extracted skips the
    /// OCR stage entirely; grade and feedback are overwritten idempotently.
    pub async fn evaluate_submission(&self, submission_id: i64) -> AppResult<EvaluationOutcome> {
        // LOADED
        let submission = self
            .storage
            .load_submission(submission_id)
            .await?
            .ok_or_else(|| AppError::submission_not_found(submission_id))?;
        let assignment = self
            .storage
            .load_assignment(submission.assignment_id)
            .await?
            .ok_or_else(|| AppError::assignment_not_found(submission.assignment_id))?;
        info!(
            "evaluating submission {} for assignment '{}'",
            submission_id, assignment.title
        );

        // OCR_PENDING -> OCR_DONE (skipped when text is already present)
        let (solution, fresh_text) = match &submission.extracted_text {
            Some(text) => {
                debug!("submission {} already has extracted text, skipping OCR", submission_id);
                (text.clone(), None)
            }
            None => {
                let image = submission
                    .image
                    .as_ref()
                    .ok_or_else(|| AppError::nothing_to_process(submission_id))?;
                let ocr = self.resolver.resolve_ocr();
                info!("extracting text with OCR provider '{}'", ocr.id());
                let raw = self
                    .with_retries(|| ocr.extract(&image.bytes, &image.media_type, &image.filename))
                    .await?;
                let clean = sanitize_text(&raw);
                (clean.clone(), Some(clean))
            }
        };

        // PROMPT_BUILT (pure, cannot fail)
        let prompt = build_prompt(GradingRequest {
            assignment: &assignment,
            solution: &solution,
        });

        // EVAL_PENDING -> EVAL_DONE
        let evaluator = self.resolver.resolve_evaluator();
        info!("evaluating with provider '{}'", evaluator.id());
        let result = self
            .with_retries(|| evaluator.evaluate(&prompt, &assignment, &solution))
            .await?;

        // PERSISTED
        let grade = clamp_grade(result.grade);
        if grade != result.grade {
            warn!(
                "evaluator '{}' produced out-of-range grade {}, clamped to {}",
                result.provider, result.grade, grade
            );
        }
        if !result.grade_parsed {
            warn!(
                "submission {} stored with fallback grade 0.0, no marker in evaluator output",
                submission_id
            );
        }

        self.storage
            .update_grading(
                submission_id,
                GradingUpdate {
                    extracted_text: fresh_text,
                    grade,
                    feedback: result.feedback.clone(),
                    grade_parsed: result.grade_parsed,
                },
            )
            .await?;
        info!(
            "submission {} persisted with grade {} (provider '{}')",
            submission_id, grade, result.provider
        );

        Ok(EvaluationOutcome {
            submission_id,
            grade,
            grade_parsed: result.grade_parsed,
            feedback: result.feedback,
            provider: result.provider,
        })
    }

    /// Runs a provider call with a bounded retry budget. Only
    /// transport-level unavailability is retried; every other failure kind
    /// indicates a persistent problem and propagates immediately.
    async fn with_retries<T, F, Fut>(&self, mut call: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut backoff = self.retry_backoff;
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "provider call failed ({}), retry {}/{} in {:?}",
                        err, attempt, self.max_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Clamps a grade into [0, 10]. Non-finite values collapse to the fallback
/// zero rather than poisoning the stored record.
fn clamp_grade(grade: f64) -> f64 {
    if !grade.is_finite() {
        return 0.0;
    }
    grade.clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_grades_pass_through() {
        assert_eq!(clamp_grade(0.0), 0.0);
        assert_eq!(clamp_grade(7.5), 7.5);
        assert_eq!(clamp_grade(10.0), 10.0);
    }

    #[test]
    fn out_of_range_grades_snap_to_the_nearest_boundary() {
        assert_eq!(clamp_grade(-3.0), 0.0);
        assert_eq!(clamp_grade(15.0), 10.0);
        assert_eq!(clamp_grade(100.0), 10.0);
    }

    #[test]
    fn non_finite_grades_collapse_to_zero() {
        assert_eq!(clamp_grade(f64::NAN), 0.0);
        assert_eq!(clamp_grade(f64::INFINITY), 0.0);
        assert_eq!(clamp_grade(f64::NEG_INFINITY), 0.0);
    }
}
