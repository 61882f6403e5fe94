//! Transient units exchanged between pipeline stages

use crate::models::Assignment;

/// What the prompt builder consumes: assignment context plus the solution
/// text extracted from the submission. Never persisted.
#[derive(Clone, Copy, Debug)]
pub struct GradingRequest<'a> {
    pub assignment: &'a Assignment,
    pub solution: &'a str,
}

/// What an evaluation provider produces. Consumed by the orchestrator to
/// update the submission; never persisted as-is.
#[derive(Clone, Debug)]
pub struct EvaluationResult {
    /// The evaluator's full response text
    pub feedback: String,
    /// Grade parsed out of the feedback, unclamped. `0.0` when no marker was
    /// found (see `grade_parsed`).
    pub grade: f64,
    /// False when the grade is the parse-failure fallback rather than a real
    /// zero. Observability signal; it never changes the stored grade.
    pub grade_parsed: bool,
    /// Identity of the provider that produced this result
    pub provider: &'static str,
}

/// The atomic dual-field write handed to the storage collaborator.
/// Grade and feedback are both-or-neither by contract.
#[derive(Clone, Debug)]
pub struct GradingUpdate {
    /// OCR text, when this run produced it
    pub extracted_text: Option<String>,
    /// Clamped to [0, 10] by the orchestrator
    pub grade: f64,
    pub feedback: String,
    pub grade_parsed: bool,
}

/// What the orchestrator returns to its caller after persistence
#[derive(Clone, Debug)]
pub struct EvaluationOutcome {
    pub submission_id: i64,
    pub grade: f64,
    pub grade_parsed: bool,
    pub feedback: String,
    /// Identity of the evaluation provider that was used
    pub provider: &'static str,
}
