//! End-to-end pipeline tests with fake providers
//!
//! These exercise the orchestrator's state machine without any network:
//! a fake resolver hands out scripted OCR/evaluation providers and every
//! call is counted, so idempotence and no-upstream-call properties are
//! asserted directly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use entrega_eval::error::{AppError, AppResult, PipelineError};
use entrega_eval::models::EvaluationResult;
use entrega_eval::providers::{EvaluationProvider, OcrProvider, ProviderResolver};
use entrega_eval::services::try_extract;
use entrega_eval::{
    Assignment, EvaluationOrchestrator, MemoryStorage, Submission, SubmissionImage,
};

/// OCR fake: counts calls, returns a fixed text
struct FakeOcr {
    calls: Arc<AtomicUsize>,
    text: &'static str,
}

#[async_trait]
impl OcrProvider for FakeOcr {
    fn id(&self) -> &'static str {
        "fake-ocr"
    }

    async fn extract(&self, _image: &[u8], _media_type: &str, _filename: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

/// Evaluator fake: counts calls, replies with a fixed text (grade parsed
/// out of it like the real implementations do). `fail_first` makes the
/// first N calls fail with the given retryable/terminal error kind.
struct FakeEvaluator {
    calls: Arc<AtomicUsize>,
    reply: &'static str,
    grade_override: Option<f64>,
    fail_first: usize,
    fail_retryable: bool,
}

#[async_trait]
impl EvaluationProvider for FakeEvaluator {
    fn id(&self) -> &'static str {
        "fake-eval"
    }

    async fn evaluate(
        &self,
        _prompt: &str,
        _assignment: &Assignment,
        _solution: &str,
    ) -> AppResult<EvaluationResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(if self.fail_retryable {
                AppError::unavailable("fake-eval", "connection refused")
            } else {
                AppError::upstream("fake-eval", Some(500), "internal error")
            });
        }

        let parsed = try_extract(self.reply);
        Ok(EvaluationResult {
            feedback: self.reply.to_string(),
            grade: self.grade_override.unwrap_or_else(|| parsed.unwrap_or(0.0)),
            grade_parsed: self.grade_override.is_some() || parsed.is_some(),
            provider: "fake-eval",
        })
    }
}

/// Resolver handing out the fakes above, sharing call counters
struct FakeResolver {
    ocr_calls: Arc<AtomicUsize>,
    ocr_text: &'static str,
    eval_calls: Arc<AtomicUsize>,
    eval_reply: &'static str,
    eval_grade_override: Option<f64>,
    eval_fail_first: usize,
    eval_fail_retryable: bool,
}

impl FakeResolver {
    fn new(ocr_text: &'static str, eval_reply: &'static str) -> Self {
        Self {
            ocr_calls: Arc::new(AtomicUsize::new(0)),
            ocr_text,
            eval_calls: Arc::new(AtomicUsize::new(0)),
            eval_reply,
            eval_grade_override: None,
            eval_fail_first: 0,
            eval_fail_retryable: false,
        }
    }
}

impl ProviderResolver for FakeResolver {
    fn resolve_ocr(&self) -> Box<dyn OcrProvider> {
        Box::new(FakeOcr {
            calls: self.ocr_calls.clone(),
            text: self.ocr_text,
        })
    }

    fn resolve_evaluator(&self) -> Box<dyn EvaluationProvider> {
        Box::new(FakeEvaluator {
            calls: self.eval_calls.clone(),
            reply: self.eval_reply,
            grade_override: self.eval_grade_override,
            fail_first: self.eval_fail_first,
            fail_retryable: self.eval_fail_retryable,
        })
    }
}

fn orchestrator(
    resolver: Arc<FakeResolver>,
    storage: Arc<MemoryStorage>,
) -> EvaluationOrchestrator {
    EvaluationOrchestrator::with_resolver(resolver, storage, 2, Duration::from_millis(1))
}

async fn seeded_storage(submission: Submission) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .insert_assignment(Assignment::new(
            10,
            "Sumas",
            "Suma los numeros del 1 al 100",
            Utc::now(),
        ))
        .await;
    storage.insert_submission(submission).await.unwrap();
    storage
}

fn image_submission(id: i64) -> Submission {
    Submission::new(
        id,
        10,
        20,
        Some(SubmissionImage {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            media_type: "image/png".to_string(),
            filename: "solucion.png".to_string(),
        }),
    )
}

#[tokio::test]
async fn grade_and_feedback_are_persisted_together() {
    let resolver = Arc::new(FakeResolver::new("print(5050)", "Buen trabajo. Nota: 9/10"));
    let storage = seeded_storage(image_submission(1)).await;

    let outcome = orchestrator(resolver.clone(), storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap();

    assert_eq!(outcome.grade, 9.0);
    assert!(outcome.grade_parsed);
    assert_eq!(outcome.feedback, "Buen trabajo. Nota: 9/10");

    let stored = storage.submission(1).await.unwrap();
    assert_eq!(stored.grade, Some(9.0));
    assert_eq!(stored.feedback.as_deref(), Some("Buen trabajo. Nota: 9/10"));
    assert_eq!(stored.extracted_text.as_deref(), Some("print(5050)"));
    assert_eq!(stored.grade_parsed, Some(true));
    assert_eq!(resolver.ocr_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.eval_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_marker_stores_the_fallback_zero() {
    let resolver = Arc::new(FakeResolver::new("print(5050)", "Buen trabajo, sigue asi."));
    let storage = seeded_storage(image_submission(1)).await;

    let outcome = orchestrator(resolver, storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap();

    assert_eq!(outcome.grade, 0.0);
    assert!(!outcome.grade_parsed);

    let stored = storage.submission(1).await.unwrap();
    assert_eq!(stored.grade, Some(0.0));
    // A fallback zero is distinguishable from a genuine zero grade
    assert_eq!(stored.grade_parsed, Some(false));
}

#[tokio::test]
async fn no_image_and_no_text_fails_without_any_upstream_call() {
    let resolver = Arc::new(FakeResolver::new("", "Nota: 5/10"));
    let storage = seeded_storage(Submission::new(1, 10, 20, None)).await;

    let err = orchestrator(resolver.clone(), storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::NothingToProcess { submission_id: 1 })
    ));
    assert_eq!(resolver.ocr_calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.eval_calls.load(Ordering::SeqCst), 0);

    // Nothing was persisted either
    let stored = storage.submission(1).await.unwrap();
    assert_eq!(stored.grade, None);
    assert_eq!(stored.feedback, None);
}

#[tokio::test]
async fn ocr_is_skipped_when_text_is_already_extracted() {
    let resolver = Arc::new(FakeResolver::new("should not be used", "Nota: 7/10"));
    let storage = seeded_storage(Submission::with_text(1, 10, 20, "texto ya extraido")).await;

    let outcome = orchestrator(resolver.clone(), storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap();

    assert_eq!(resolver.ocr_calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.eval_calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.grade, 7.0);

    // The pre-existing text survives the update
    let stored = storage.submission(1).await.unwrap();
    assert_eq!(stored.extracted_text.as_deref(), Some("texto ya extraido"));
}

#[tokio::test]
async fn out_of_range_grades_are_clamped_before_persistence() {
    let mut resolver = FakeResolver::new("print(5050)", "Nota: 15/10");
    resolver.eval_grade_override = Some(15.0);
    let storage = seeded_storage(image_submission(1)).await;

    let outcome = orchestrator(Arc::new(resolver), storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap();
    assert_eq!(outcome.grade, 10.0);
    assert_eq!(storage.submission(1).await.unwrap().grade, Some(10.0));

    let mut resolver = FakeResolver::new("print(5050)", "irrelevante");
    resolver.eval_grade_override = Some(-3.0);
    let storage = seeded_storage(image_submission(1)).await;

    let outcome = orchestrator(Arc::new(resolver), storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap();
    assert_eq!(outcome.grade, 0.0);
    assert_eq!(storage.submission(1).await.unwrap().grade, Some(0.0));
}

#[tokio::test]
async fn missing_submission_is_a_not_found_error() {
    let resolver = Arc::new(FakeResolver::new("", "Nota: 5/10"));
    let storage = Arc::new(MemoryStorage::new());

    let err = orchestrator(resolver, storage)
        .evaluate_submission(99)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::SubmissionNotFound { id: 99 })
    ));
}

#[tokio::test]
async fn missing_assignment_is_a_not_found_error() {
    let resolver = Arc::new(FakeResolver::new("", "Nota: 5/10"));
    let storage = Arc::new(MemoryStorage::new());
    // Submission present, its assignment missing
    storage
        .insert_submission(Submission::with_text(1, 10, 20, "hola"))
        .await
        .unwrap();

    let err = orchestrator(resolver, storage)
        .evaluate_submission(1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::AssignmentNotFound { id: 10 })
    ));
}

#[tokio::test]
async fn transient_unavailability_is_retried() {
    let mut resolver = FakeResolver::new("print(5050)", "Nota: 6/10");
    resolver.eval_fail_first = 1;
    resolver.eval_fail_retryable = true;
    let resolver = Arc::new(resolver);
    let storage = seeded_storage(image_submission(1)).await;

    let outcome = orchestrator(resolver.clone(), storage)
        .evaluate_submission(1)
        .await
        .unwrap();

    assert_eq!(outcome.grade, 6.0);
    assert_eq!(resolver.eval_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn upstream_errors_are_not_retried() {
    let mut resolver = FakeResolver::new("print(5050)", "Nota: 6/10");
    resolver.eval_fail_first = 1;
    resolver.eval_fail_retryable = false;
    let resolver = Arc::new(resolver);
    let storage = seeded_storage(image_submission(1)).await;

    let err = orchestrator(resolver.clone(), storage.clone())
        .evaluate_submission(1)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Provider(_)));
    assert_eq!(resolver.eval_calls.load(Ordering::SeqCst), 1);
    // The failed run left the submission untouched
    assert_eq!(storage.submission(1).await.unwrap().grade, None);
}

#[tokio::test]
async fn rerunning_overwrites_the_previous_result() {
    let resolver = Arc::new(FakeResolver::new("print(5050)", "Nota: 4/10"));
    let storage = seeded_storage(image_submission(1)).await;

    let orchestrator = orchestrator(resolver.clone(), storage.clone());
    orchestrator.evaluate_submission(1).await.unwrap();
    orchestrator.evaluate_submission(1).await.unwrap();

    // The second run reused the extracted text instead of re-invoking OCR
    assert_eq!(resolver.ocr_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.eval_calls.load(Ordering::SeqCst), 2);
    assert_eq!(storage.submission(1).await.unwrap().grade, Some(4.0));
}
