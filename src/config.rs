//! Runtime configuration
//!
//! Everything is sourced from the environment once at startup and treated as
//! immutable afterwards. Provider credentials have no baked-in defaults: a
//! selected provider whose credential is absent fails `Config::from_env`.

use std::str::FromStr;

use crate::error::{AppError, AppResult, ConfigError};
use crate::providers::registry;

/// Process-wide provider configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Active evaluation provider id (`openai`, `gateway`, `ollama`, ...)
    pub eval_provider: String,
    /// Active OCR provider id (`azure`, `qwen7b`, `qwen3b`, `gemma3`)
    pub ocr_provider: String,
    // --- evaluation backend ---
    pub eval_base_url: String,
    pub eval_api_key: Option<String>,
    pub eval_model: String,
    // --- OCR backend ---
    pub ocr_base_url: String,
    pub ocr_api_key: Option<String>,
    /// Overrides the model path segment of the synchronous OCR endpoint
    pub ocr_model: Option<String>,
    // --- sampling parameters (generate-style backend) ---
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    // --- network budgets ---
    /// Connect timeout for every backend call, in seconds
    pub connect_timeout_secs: u64,
    /// Read timeout for every backend call, in seconds
    pub request_timeout_secs: u64,
    /// Cadence of the asynchronous OCR status poll, in milliseconds
    pub poll_interval_ms: u64,
    /// Overall deadline for the asynchronous OCR operation, in seconds
    pub poll_deadline_secs: u64,
    /// Extra attempts after a transport-level failure
    pub max_retries: u32,
    /// Initial backoff between retries, in milliseconds (doubles per attempt)
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eval_provider: "openai".to_string(),
            ocr_provider: "qwen7b".to_string(),
            eval_base_url: "https://api.openai.com/v1".to_string(),
            eval_api_key: None,
            eval_model: "gpt-3.5-turbo".to_string(),
            ocr_base_url: "http://localhost:8000".to_string(),
            ocr_api_key: None,
            ocr_model: None,
            max_tokens: 4096,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            poll_interval_ms: 1000,
            poll_deadline_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl Config {
    /// Loads the configuration from the environment.
    ///
    /// Fails when a numeric variable cannot be parsed or when the selected
    /// provider needs a credential that is not set.
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();

        let eval_provider = std::env::var("EVAL_PROVIDER")
            .unwrap_or(default.eval_provider)
            .to_lowercase();
        let ocr_provider = std::env::var("OCR_PROVIDER")
            .unwrap_or(default.ocr_provider)
            .to_lowercase();

        let eval_base_url =
            std::env::var("EVAL_API_BASE_URL").unwrap_or_else(|_| match eval_provider.as_str() {
                "gateway" | "lmstudio" => "http://localhost:1234/v1".to_string(),
                "ollama" | "llama" => "http://localhost:8001".to_string(),
                _ => default.eval_base_url.clone(),
            });
        let eval_model =
            std::env::var("EVAL_MODEL").unwrap_or_else(|_| match eval_provider.as_str() {
                "ollama" | "llama" => "gemma3:12b".to_string(),
                "gateway" | "lmstudio" => "local-model".to_string(),
                _ => default.eval_model.clone(),
            });

        let config = Self {
            eval_provider,
            ocr_provider,
            eval_base_url,
            eval_api_key: std::env::var("EVAL_API_KEY").ok(),
            eval_model,
            ocr_base_url: std::env::var("OCR_API_URL").unwrap_or(default.ocr_base_url),
            ocr_api_key: std::env::var("OCR_API_KEY").ok(),
            ocr_model: std::env::var("OCR_MODEL").ok(),
            max_tokens: env_parse("EVAL_MAX_TOKENS")?.unwrap_or(default.max_tokens),
            temperature: env_parse("EVAL_TEMPERATURE")?.unwrap_or(default.temperature),
            top_p: env_parse("EVAL_TOP_P")?.unwrap_or(default.top_p),
            top_k: env_parse("EVAL_TOP_K")?.unwrap_or(default.top_k),
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS")?
                .unwrap_or(default.connect_timeout_secs),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")?
                .unwrap_or(default.request_timeout_secs),
            poll_interval_ms: env_parse("OCR_POLL_INTERVAL_MS")?
                .unwrap_or(default.poll_interval_ms),
            poll_deadline_secs: env_parse("OCR_POLL_DEADLINE_SECS")?
                .unwrap_or(default.poll_deadline_secs),
            max_retries: env_parse("MAX_RETRIES")?.unwrap_or(default.max_retries),
            retry_backoff_ms: env_parse("RETRY_BACKOFF_MS")?.unwrap_or(default.retry_backoff_ms),
        };

        config.check_credentials()?;
        Ok(config)
    }

    /// A provider that authenticates must have its credential at startup.
    /// The registry tables decide which providers those are, including the
    /// fallbacks an unknown id resolves to.
    fn check_credentials(&self) -> AppResult<()> {
        if registry::eval_requires_credential(&self.eval_provider) && self.eval_api_key.is_none() {
            return Err(AppError::missing_credential(&self.eval_provider, "EVAL_API_KEY"));
        }
        if registry::ocr_requires_credential(&self.ocr_provider) && self.ocr_api_key.is_none() {
            return Err(AppError::missing_credential(&self.ocr_provider, "OCR_API_KEY"));
        }
        Ok(())
    }
}

/// Reads and parses an optional environment variable.
/// An unparsable value is a hard error rather than a silent fallback.
fn env_parse<T: FromStr>(var_name: &'static str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(AppError::Config(ConfigError::InvalidValue {
                var_name,
                value: raw,
            })),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_eval_provider_requires_a_credential() {
        let config = Config {
            eval_provider: "openai".to_string(),
            eval_api_key: None,
            ..Config::default()
        };
        assert!(config.check_credentials().is_err());
    }

    #[test]
    fn azure_ocr_requires_a_credential() {
        let config = Config {
            eval_provider: "ollama".to_string(),
            ocr_provider: "azure".to_string(),
            ocr_api_key: None,
            ..Config::default()
        };
        assert!(config.check_credentials().is_err());
    }

    #[test]
    fn self_hosted_providers_need_no_credential() {
        let config = Config {
            eval_provider: "ollama".to_string(),
            ocr_provider: "qwen7b".to_string(),
            ..Config::default()
        };
        assert!(config.check_credentials().is_ok());
    }
}
