//! Demo binary: evaluates one image file against an assignment described on
//! the command line, using the providers selected in the environment.
//!
//! ```text
//! entrega-eval <image> [title] [brief]
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::info;

use entrega_eval::{
    Assignment, Config, EvaluationOrchestrator, MemoryStorage, ProviderRegistry, Submission,
    SubmissionImage,
};

#[tokio::main]
async fn main() -> Result<()> {
    entrega_eval::utils::logging::init();

    let config = Config::from_env()?;

    let args: Vec<String> = std::env::args().collect();
    let image_path = args
        .get(1)
        .context("usage: entrega-eval <image> [title] [brief]")?;
    let title = args.get(2).map(String::as_str).unwrap_or("Actividad de prueba");
    let brief = args
        .get(3)
        .map(String::as_str)
        .unwrap_or("Resuelve el ejercicio propuesto en clase");

    let bytes = std::fs::read(image_path)
        .with_context(|| format!("could not read image {}", image_path))?;
    let filename = Path::new(image_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("submission")
        .to_string();
    let media_type = media_type_for(&filename);

    let storage = Arc::new(MemoryStorage::new());
    storage
        .insert_assignment(Assignment::new(1, title, brief, Utc::now() + Duration::days(1)))
        .await;
    storage
        .insert_submission(Submission::new(
            1,
            1,
            1,
            Some(SubmissionImage {
                bytes,
                media_type: media_type.to_string(),
                filename,
            }),
        ))
        .await?;

    let registry = ProviderRegistry::new(config);
    let orchestrator = EvaluationOrchestrator::new(registry, storage);
    let outcome = orchestrator.evaluate_submission(1).await?;

    info!(
        "grade {} (marker parsed: {}) via provider '{}'",
        outcome.grade, outcome.grade_parsed, outcome.provider
    );
    println!("{}", outcome.feedback);
    println!("Nota final: {}/10", outcome.grade);

    Ok(())
}

/// Best-effort media type from the file extension
fn media_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
