//! Generate-style evaluation backend
//!
//! The simplest upstream shape: a single prompt string plus sampling
//! parameters, one response string back. Typical of self-hosted model
//! runners.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Assignment, EvaluationResult};
use crate::providers::eval::into_result;
use crate::providers::EvaluationProvider;

/// `POST {base}/generate` request body
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

/// `POST {base}/generate` response body
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for the single-shot `/generate` endpoint
pub struct GenerateEvaluator {
    base_url: String,
    model: String,
    config: Config,
}

impl GenerateEvaluator {
    /// Provider identifier
    pub const ID: &'static str = "ollama";

    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.eval_base_url.clone(),
            model: config.eval_model.clone(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl EvaluationProvider for GenerateEvaluator {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn evaluate(
        &self,
        prompt: &str,
        _assignment: &Assignment,
        _solution: &str,
    ) -> AppResult<EvaluationResult> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::unavailable(Self::ID, e.to_string()))?;

        let url = format!("{}/generate", self.base_url);
        debug!("calling generate backend at {}, model {}", url, self.model);

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            top_k: self.config.top_k,
        };

        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(Self::ID, e))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::authentication(Self::ID));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(Self::ID, Some(status.as_u16()), text));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AppError::from_reqwest(Self::ID, e))?;
        let payload: GenerateResponse =
            serde_json::from_str(&raw).map_err(|_| AppError::malformed(Self::ID, &raw))?;

        Ok(into_result(Self::ID, payload.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_the_sampling_parameters() {
        let body = GenerateRequest {
            model: "gemma3:12b",
            prompt: "evalua esto",
            max_tokens: 4096,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gemma3:12b");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["top_k"], 40);
    }

    #[test]
    fn rejects_an_unexpected_response_shape() {
        assert!(serde_json::from_str::<GenerateResponse>(r#"{"output": "x"}"#).is_err());
        let ok: GenerateResponse = serde_json::from_str(r#"{"response": "Nota: 5/10"}"#).unwrap();
        assert_eq!(ok.response, "Nota: 5/10");
    }
}
