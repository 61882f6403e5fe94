//! Provider layer
//!
//! Everything that talks to an upstream model backend lives here, behind two
//! trait seams:
//!
//! - [`OcrProvider`] turns an image into text
//! - [`EvaluationProvider`] turns (prompt, solution) into feedback + grade
//!
//! Implementations are stateless and cheap to instantiate: the registry
//! hands out a fresh boxed provider per resolution, so nothing is shared
//! between concurrent evaluation requests.

pub mod eval;
pub mod ocr;
pub mod registry;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Assignment, EvaluationResult};

pub use registry::ProviderRegistry;

/// Resolution seam the orchestrator depends on. The production
/// implementation is [`ProviderRegistry`]; tests substitute their own
/// resolver with fake providers.
pub trait ProviderResolver: Send + Sync {
    /// Returns a fresh instance of the active OCR provider
    fn resolve_ocr(&self) -> Box<dyn OcrProvider>;

    /// Returns a fresh instance of the active evaluation provider
    fn resolve_evaluator(&self) -> Box<dyn EvaluationProvider>;
}

/// Turns an image into plain text via some upstream OCR backend.
///
/// Fails with `UpstreamUnavailable` (connection refused / timeout),
/// `Upstream` (non-success status) or `Malformed` (unexpected payload).
/// Never mutates the submission; the extracted text goes back to the caller.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Stable identifier used in logs and error messages
    fn id(&self) -> &'static str;

    /// Extracts the text of one image
    async fn extract(&self, image: &[u8], media_type: &str, filename: &str) -> AppResult<String>;
}

/// Turns a grading prompt plus the learner's solution into feedback and a
/// parsed grade. Exactly one upstream call per invocation; the assistant's
/// text is handed to the grade extractor.
///
/// Fails with the OCR error kinds plus `Authentication` when the backend
/// rejects the configured credential.
#[async_trait]
pub trait EvaluationProvider: Send + Sync {
    /// Stable identifier used in logs, errors and the persisted outcome
    fn id(&self) -> &'static str;

    /// Evaluates one solution
    async fn evaluate(
        &self,
        prompt: &str,
        assignment: &Assignment,
        solution: &str,
    ) -> AppResult<EvaluationResult>;
}
