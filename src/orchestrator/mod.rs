//! Orchestration layer
//!
//! One module, one job: drive a single submission through
//! load -> OCR -> prompt -> evaluation -> persistence. Holds no provider
//! state of its own; providers come from the registry per request and the
//! storage collaborator is injected.

pub mod evaluation;

pub use evaluation::EvaluationOrchestrator;
