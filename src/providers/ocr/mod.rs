pub mod predict;
pub mod read;

pub use predict::PredictOcr;
pub use read::ReadOcr;

use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Builds the HTTP client shared by the OCR implementations. Connect and
/// read timeouts always apply; no backend call may hang indefinitely.
pub(crate) fn http_client(config: &Config, provider: &'static str) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| AppError::unavailable(provider, e.to_string()))
}
