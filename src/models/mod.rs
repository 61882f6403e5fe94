pub mod assignment;
pub mod evaluation;
pub mod submission;

pub use assignment::Assignment;
pub use evaluation::{EvaluationOutcome, EvaluationResult, GradingRequest, GradingUpdate};
pub use submission::{Submission, SubmissionImage};
