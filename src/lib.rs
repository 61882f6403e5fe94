//! # entrega-eval
//!
//! Submission evaluation pipeline for an academic platform: a learner's
//! photographed solution goes through a pluggable OCR backend, the extracted
//! text plus assignment context go to a pluggable AI evaluation backend, and
//! a bounded numeric grade is parsed out of the evaluator's free-form text
//! and persisted.
//!
//! ## Architecture
//!
//! The crate is layered strictly, dependencies pointing downward only:
//!
//! ### Capability layer (`services`)
//! - `grade_extractor` - pulls `Nota: n/10` out of evaluator text (pure)
//! - `prompt_builder` - renders the grading prompt (pure, deterministic)
//! - `text` - OCR output cleanup
//!
//! ### Provider layer (`providers`)
//! - `OcrProvider` / `EvaluationProvider` trait seams
//! - `ocr::PredictOcr` - synchronous multipart inference endpoint
//! - `ocr::ReadOcr` - asynchronous submit-then-poll endpoint with deadline
//! - `eval::{CloudChatEvaluator, GatewayChatEvaluator, GenerateEvaluator}`
//! - `registry::ProviderRegistry` - id -> provider resolution with defaults
//!
//! ### Orchestration layer (`orchestrator`)
//! - `EvaluationOrchestrator` - load -> OCR -> prompt -> evaluate -> persist,
//!   with bounded retries and grade clamping
//!
//! ### Boundaries
//! - `storage::Storage` - the external persistence collaborator
//! - `config::Config` - environment-sourced, immutable per request

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export the types most callers need
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Assignment, EvaluationOutcome, Submission, SubmissionImage};
pub use orchestrator::EvaluationOrchestrator;
pub use providers::{EvaluationProvider, OcrProvider, ProviderRegistry, ProviderResolver};
pub use storage::{MemoryStorage, Storage};
