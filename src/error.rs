use std::fmt;

/// Maximum number of raw payload characters echoed into a `Malformed` error.
const PAYLOAD_PREVIEW_LEN: usize = 200;

/// Top-level application error type
#[derive(Debug)]
pub enum AppError {
    /// Pipeline state errors (missing records, nothing to process)
    Pipeline(PipelineError),
    /// Provider call errors (OCR / evaluation backends)
    Provider(ProviderError),
    /// Configuration errors (startup time)
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Pipeline(e) => write!(f, "pipeline error: {}", e),
            AppError::Provider(e) => write!(f, "provider error: {}", e),
            AppError::Config(e) => write!(f, "config error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Pipeline(e) => Some(e),
            AppError::Provider(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// Errors raised by the evaluation pipeline itself, before any provider is
/// involved. These are client errors: none of them is ever retried.
#[derive(Debug)]
pub enum PipelineError {
    /// The submission does not exist
    SubmissionNotFound { id: i64 },
    /// The assignment does not exist
    AssignmentNotFound { id: i64 },
    /// The submission has neither extracted text nor an image to OCR
    NothingToProcess { submission_id: i64 },
    /// A submission for this (assignment, learner) pair already exists
    DuplicateSubmission { assignment_id: i64, learner_id: i64 },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::SubmissionNotFound { id } => {
                write!(f, "submission {} not found", id)
            }
            PipelineError::AssignmentNotFound { id } => {
                write!(f, "assignment {} not found", id)
            }
            PipelineError::NothingToProcess { submission_id } => {
                write!(
                    f,
                    "submission {} has no image and no extracted text, nothing to process",
                    submission_id
                )
            }
            PipelineError::DuplicateSubmission {
                assignment_id,
                learner_id,
            } => {
                write!(
                    f,
                    "learner {} already has a submission for assignment {}",
                    learner_id, assignment_id
                )
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Errors raised while talking to an OCR or evaluation backend
#[derive(Debug)]
pub enum ProviderError {
    /// Connection refused, DNS failure or timeout. The only retryable kind.
    Unavailable {
        provider: &'static str,
        detail: String,
    },
    /// The backend answered with a non-success status
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        detail: String,
    },
    /// The backend answered 2xx but the payload had an unexpected shape
    Malformed {
        provider: &'static str,
        detail: String,
    },
    /// The backend rejected our credential. Fatal for the current
    /// configuration, never retried.
    Authentication { provider: &'static str },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable { provider, detail } => {
                write!(f, "{} unavailable: {}", provider, detail)
            }
            ProviderError::Upstream {
                provider,
                status,
                detail,
            } => match status {
                Some(code) => write!(f, "{} returned status {}: {}", provider, code, detail),
                None => write!(f, "{} returned an error: {}", provider, detail),
            },
            ProviderError::Malformed { provider, detail } => {
                write!(f, "{} returned a malformed response: {}", provider, detail)
            }
            ProviderError::Authentication { provider } => {
                write!(f, "{} rejected the configured credential", provider)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Startup-time configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// A selected provider requires a credential that is not set.
    /// There are deliberately no baked-in default credentials.
    MissingCredential {
        provider: String,
        var_name: &'static str,
    },
    /// An environment variable could not be parsed
    InvalidValue {
        var_name: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCredential { provider, var_name } => {
                write!(
                    f,
                    "provider '{}' is selected but {} is not set",
                    provider, var_name
                )
            }
            ConfigError::InvalidValue { var_name, value } => {
                write!(
                    f,
                    "environment variable {} has invalid value '{}'",
                    var_name, value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== Convenience constructors ==========

impl AppError {
    /// Missing submission
    pub fn submission_not_found(id: i64) -> Self {
        AppError::Pipeline(PipelineError::SubmissionNotFound { id })
    }

    /// Missing assignment
    pub fn assignment_not_found(id: i64) -> Self {
        AppError::Pipeline(PipelineError::AssignmentNotFound { id })
    }

    /// Submission carries nothing the pipeline can work on
    pub fn nothing_to_process(submission_id: i64) -> Self {
        AppError::Pipeline(PipelineError::NothingToProcess { submission_id })
    }

    /// Second submission for the same (assignment, learner) pair
    pub fn duplicate_submission(assignment_id: i64, learner_id: i64) -> Self {
        AppError::Pipeline(PipelineError::DuplicateSubmission {
            assignment_id,
            learner_id,
        })
    }

    /// Backend unreachable (connection refused / timeout)
    pub fn unavailable(provider: &'static str, detail: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::Unavailable {
            provider,
            detail: detail.into(),
        })
    }

    /// Backend returned a non-success status
    pub fn upstream(
        provider: &'static str,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        AppError::Provider(ProviderError::Upstream {
            provider,
            status,
            detail: detail.into(),
        })
    }

    /// Backend payload had an unexpected shape. The raw payload is truncated
    /// before it lands in logs or error chains.
    pub fn malformed(provider: &'static str, payload: &str) -> Self {
        AppError::Provider(ProviderError::Malformed {
            provider,
            detail: truncate_payload(payload),
        })
    }

    /// Credential rejected by the backend
    pub fn authentication(provider: &'static str) -> Self {
        AppError::Provider(ProviderError::Authentication { provider })
    }

    /// Credential absent at startup
    pub fn missing_credential(provider: impl Into<String>, var_name: &'static str) -> Self {
        AppError::Config(ConfigError::MissingCredential {
            provider: provider.into(),
            var_name,
        })
    }

    /// Returns true when a bounded retry with backoff is worthwhile.
    /// Only transport-level unavailability qualifies; upstream errors,
    /// malformed payloads and credential rejections are persistent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Provider(ProviderError::Unavailable { .. }))
    }

    /// Maps a `reqwest` transport error into the taxonomy for the given
    /// provider. Status-bearing responses are handled at the call site, so
    /// almost everything that reaches here is a connectivity problem.
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Provider(ProviderError::Malformed {
                provider,
                detail: err.to_string(),
            })
        } else {
            AppError::unavailable(provider, err.to_string())
        }
    }
}

/// Truncates a raw payload for diagnosis without flooding the logs
fn truncate_payload(payload: &str) -> String {
    if payload.chars().count() > PAYLOAD_PREVIEW_LEN {
        payload.chars().take(PAYLOAD_PREVIEW_LEN).collect::<String>() + "..."
    } else {
        payload.to_string()
    }
}

// ========== Result type alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
