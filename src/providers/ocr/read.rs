//! Asynchronous, polling OCR backend
//!
//! The read/analyze flavor of OCR: submitting the image returns an operation
//! handle immediately, and the result must be polled on a fixed cadence
//! until the operation leaves `{notStarted, running}`. The whole operation
//! runs under a deadline; expiry surfaces as an unavailability timeout
//! instead of polling forever.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::providers::ocr::http_client;
use crate::providers::OcrProvider;

/// Header carrying the subscription credential
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
/// Header of the 202 response pointing at the operation to poll
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

/// `GET <operation-url>` response body
#[derive(Debug, Deserialize)]
struct ReadOperation {
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(rename = "readResults", default)]
    read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

/// Client for the submit-then-poll `/analyze` OCR endpoint
pub struct ReadOcr {
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    poll_deadline: Duration,
    config: Config,
}

impl ReadOcr {
    /// Provider identifier
    pub const ID: &'static str = "azure";

    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.ocr_base_url.clone(),
            api_key: config.ocr_api_key.clone().unwrap_or_default(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            poll_deadline: Duration::from_secs(config.poll_deadline_secs),
            config: config.clone(),
        }
    }

    /// Submits the image. Returns the operation URL to poll.
    async fn submit(&self, client: &reqwest::Client, image: &[u8]) -> AppResult<String> {
        let url = format!("{}/analyze", self.base_url);
        debug!("submitting {} bytes to {}", image.len(), url);

        let response = client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(Self::ID, e))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::authentication(Self::ID));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(Self::ID, Some(status.as_u16()), body));
        }

        response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AppError::malformed(Self::ID, "missing Operation-Location header"))
    }

    /// Fetches the operation state once
    async fn poll_once(
        &self,
        client: &reqwest::Client,
        operation_url: &str,
    ) -> AppResult<ReadOperation> {
        let response = client
            .get(operation_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(Self::ID, e))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::authentication(Self::ID));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(Self::ID, Some(status.as_u16()), body));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AppError::from_reqwest(Self::ID, e))?;
        serde_json::from_str(&raw).map_err(|_| AppError::malformed(Self::ID, &raw))
    }
}

#[async_trait]
impl OcrProvider for ReadOcr {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn extract(&self, image: &[u8], _media_type: &str, _filename: &str) -> AppResult<String> {
        let client = http_client(&self.config, Self::ID)?;
        let operation_url = self.submit(&client, image).await?;
        let deadline = Instant::now() + self.poll_deadline;

        loop {
            let operation = self.poll_once(&client, &operation_url).await?;
            match operation.status.as_str() {
                "notStarted" | "running" => {
                    if Instant::now() + self.poll_interval >= deadline {
                        return Err(AppError::unavailable(
                            Self::ID,
                            format!(
                                "read operation still '{}' after {}s deadline",
                                operation.status,
                                self.poll_deadline.as_secs()
                            ),
                        ));
                    }
                    debug!("read operation '{}', polling again", operation.status);
                    tokio::time::sleep(self.poll_interval).await;
                }
                "succeeded" => {
                    let result = operation.analyze_result.ok_or_else(|| {
                        AppError::malformed(Self::ID, "succeeded without analyzeResult")
                    })?;
                    return Ok(join_lines(&result));
                }
                other => {
                    return Err(AppError::upstream(
                        Self::ID,
                        None,
                        format!("read operation ended with status '{}'", other),
                    ));
                }
            }
        }
    }
}

/// Joins every recognized line in document order with newline separators.
/// All pages are included, not just the first.
fn join_lines(result: &AnalyzeResult) -> String {
    result
        .read_results
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_in_document_order() {
        let raw = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "readResults": [
                    {"lines": [{"text": "def f():"}, {"text": "    return 1"}]}
                ]
            }
        }"#;
        let operation: ReadOperation = serde_json::from_str(raw).unwrap();
        let result = operation.analyze_result.unwrap();
        assert_eq!(join_lines(&result), "def f():\n    return 1");
    }

    #[test]
    fn joins_lines_across_pages() {
        let raw = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "readResults": [
                    {"lines": [{"text": "pagina 1"}]},
                    {"lines": [{"text": "pagina 2"}]}
                ]
            }
        }"#;
        let operation: ReadOperation = serde_json::from_str(raw).unwrap();
        assert_eq!(join_lines(&operation.analyze_result.unwrap()), "pagina 1\npagina 2");
    }

    #[test]
    fn running_operation_has_no_result_yet() {
        let operation: ReadOperation = serde_json::from_str(r#"{"status": "running"}"#).unwrap();
        assert_eq!(operation.status, "running");
        assert!(operation.analyze_result.is_none());
    }

    #[test]
    fn empty_result_joins_to_empty_text() {
        let result = AnalyzeResult { read_results: vec![] };
        assert_eq!(join_lines(&result), "");
    }
}
