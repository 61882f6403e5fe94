//! Synchronous OCR backend
//!
//! A single request/response call against a self-hosted inference endpoint:
//! the image goes up as a multipart payload, the text comes back in one
//! field. One client type covers every model the endpoint serves; only the
//! path segment differs.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::providers::ocr::http_client;
use crate::providers::OcrProvider;

/// `POST {base}/predict/{model}` response body
#[derive(Debug, Deserialize)]
struct PredictResponse {
    prediction: String,
}

/// Client for the multipart `/predict/{model}` OCR endpoint
pub struct PredictOcr {
    id: &'static str,
    base_url: String,
    model: String,
    config: Config,
}

impl PredictOcr {
    /// Creates a client for one served model. `model` is the path segment
    /// the endpoint routes on; the configured `ocr_model` overrides it.
    pub fn new(config: &Config, id: &'static str, model: &'static str) -> Self {
        Self {
            id,
            base_url: config.ocr_base_url.clone(),
            model: config.ocr_model.clone().unwrap_or_else(|| model.to_string()),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl OcrProvider for PredictOcr {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn extract(&self, image: &[u8], media_type: &str, filename: &str) -> AppResult<String> {
        let client = http_client(&self.config, self.id)?;
        let url = format!("{}/predict/{}", self.base_url, self.model);
        debug!("uploading {} bytes to {}", image.len(), url);

        let part = Part::bytes(image.to_vec()).file_name(filename.to_string());
        // A submission may declare a media type reqwest does not recognize;
        // the backend sniffs the bytes anyway, so send the part without one.
        let part = match part.mime_str(media_type) {
            Ok(typed) => typed,
            Err(_) => {
                warn!("unrecognized media type '{}', sending untyped part", media_type);
                Part::bytes(image.to_vec()).file_name(filename.to_string())
            }
        };
        let form = Form::new().part("image", part);

        let response = client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(self.id, e))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(AppError::upstream(
                self.id,
                Some(404),
                "OCR service not found; check that the inference API is running",
            ));
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::authentication(self.id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(self.id, Some(status.as_u16()), body));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AppError::from_reqwest(self.id, e))?;
        let payload: PredictResponse =
            serde_json::from_str(&raw).map_err(|_| AppError::malformed(self.id, &raw))?;

        debug!("OCR extracted {} characters", payload.prediction.len());
        Ok(payload.prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_prediction_field() {
        let payload: PredictResponse =
            serde_json::from_str(r#"{"prediction": "def f():\n    return 1"}"#).unwrap();
        assert_eq!(payload.prediction, "def f():\n    return 1");
    }

    #[test]
    fn rejects_a_payload_without_prediction() {
        assert!(serde_json::from_str::<PredictResponse>(r#"{"text": "x"}"#).is_err());
    }

    #[test]
    fn configured_model_overrides_the_default_segment() {
        let config = Config {
            ocr_model: Some("qwen7b-int8".to_string()),
            ..Config::default()
        };
        let ocr = PredictOcr::new(&config, "qwen7b", "qwen7b");
        assert_eq!(ocr.model, "qwen7b-int8");

        let ocr = PredictOcr::new(&Config::default(), "gemma3", "gemma3:4b");
        assert_eq!(ocr.model, "gemma3:4b");
    }
}
