pub mod chat;
pub mod generate;

pub use chat::{CloudChatEvaluator, GatewayChatEvaluator};
pub use generate::GenerateEvaluator;

use async_openai::error::OpenAIError;
use tracing::warn;

use crate::error::AppError;
use crate::models::EvaluationResult;
use crate::services::grade_extractor;

/// Wraps the evaluator's raw text into a result, pulling the grade out of
/// the mandated marker. A parse miss is not an error: the grade falls back
/// to `0.0` with `grade_parsed = false` so callers can tell the two apart.
pub(crate) fn into_result(provider: &'static str, feedback: String) -> EvaluationResult {
    let parsed = grade_extractor::try_extract(&feedback);
    if parsed.is_none() {
        warn!(
            "evaluator '{}' produced no parseable grade marker, falling back to 0.0",
            provider
        );
    }
    EvaluationResult {
        grade: parsed.unwrap_or(0.0),
        grade_parsed: parsed.is_some(),
        feedback,
        provider,
    }
}

/// Maps `async-openai` failures into the provider error taxonomy
pub(crate) fn map_openai_error(provider: &'static str, err: OpenAIError) -> AppError {
    match err {
        OpenAIError::Reqwest(e) => AppError::from_reqwest(provider, e),
        OpenAIError::ApiError(api) => {
            let message = api.message.to_lowercase();
            if message.contains("api key")
                || message.contains("unauthorized")
                || message.contains("authentication")
            {
                AppError::authentication(provider)
            } else {
                AppError::upstream(provider, None, api.message)
            }
        }
        OpenAIError::JSONDeserialize(e, _) => AppError::malformed(provider, &e.to_string()),
        other => AppError::upstream(provider, None, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_result_parses_the_marker() {
        let result = into_result("openai", "Buen trabajo. Nota: 9/10".to_string());
        assert_eq!(result.grade, 9.0);
        assert!(result.grade_parsed);
        assert_eq!(result.feedback, "Buen trabajo. Nota: 9/10");
        assert_eq!(result.provider, "openai");
    }

    #[test]
    fn into_result_flags_a_parse_miss() {
        let result = into_result("openai", "Buen trabajo, sigue asi.".to_string());
        assert_eq!(result.grade, 0.0);
        assert!(!result.grade_parsed);
    }
}
