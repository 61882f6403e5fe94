//! Provider resolution
//!
//! The registry maps the configured provider identifiers through a closed
//! table to concrete implementations, once per resolution. It is a plain
//! constructed value passed to the orchestrator explicitly, so tests can
//! substitute fake providers without touching process state. Construction
//! of every provider is cheap; each resolution returns a fresh instance.

use phf::phf_map;
use tracing::warn;

use crate::config::Config;
use crate::providers::eval::{CloudChatEvaluator, GatewayChatEvaluator, GenerateEvaluator};
use crate::providers::ocr::{PredictOcr, ReadOcr};
use crate::providers::{EvaluationProvider, OcrProvider};

/// Known OCR backend shapes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OcrKind {
    /// Submit-then-poll read/analyze endpoint
    Read,
    /// Single multipart request against `/predict/{model}`
    Predict {
        id: &'static str,
        model: &'static str,
    },
}

/// Known evaluation backend shapes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EvalKind {
    /// Key-authenticated cloud chat API
    Cloud,
    /// Self-hosted OpenAI-style chat gateway
    Gateway,
    /// Self-hosted single-prompt generate endpoint
    Generate,
}

/// Fallback when the configured OCR id is unknown
const DEFAULT_OCR: OcrKind = OcrKind::Predict {
    id: "qwen7b",
    model: "qwen7b",
};
/// Fallback when the configured evaluation id is unknown
const DEFAULT_EVAL: EvalKind = EvalKind::Cloud;

static OCR_PROVIDERS: phf::Map<&'static str, OcrKind> = phf_map! {
    "azure" => OcrKind::Read,
    "qwen7b" => OcrKind::Predict { id: "qwen7b", model: "qwen7b" },
    "qwen3b" => OcrKind::Predict { id: "qwen3b", model: "qwen3b" },
    "gemma3" => OcrKind::Predict { id: "gemma3", model: "gemma3:4b" },
};

static EVAL_PROVIDERS: phf::Map<&'static str, EvalKind> = phf_map! {
    "openai" => EvalKind::Cloud,
    "gpt" => EvalKind::Cloud,
    "gateway" => EvalKind::Gateway,
    "lmstudio" => EvalKind::Gateway,
    "ollama" => EvalKind::Generate,
    "llama" => EvalKind::Generate,
};

/// True when the given evaluation provider id (or its fallback) needs a
/// credential at startup
pub fn eval_requires_credential(id: &str) -> bool {
    matches!(
        EVAL_PROVIDERS.get(id).copied().unwrap_or(DEFAULT_EVAL),
        EvalKind::Cloud
    )
}

/// True when the given OCR provider id (or its fallback) needs a credential
/// at startup
pub fn ocr_requires_credential(id: &str) -> bool {
    matches!(
        OCR_PROVIDERS.get(id).copied().unwrap_or(DEFAULT_OCR),
        OcrKind::Read
    )
}

/// Resolves the active providers from the runtime configuration
pub struct ProviderRegistry {
    config: Config,
}

impl ProviderRegistry {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration the registry resolves against
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl crate::providers::ProviderResolver for ProviderRegistry {
    /// Returns a fresh instance of the active OCR provider. An unknown id
    /// logs a warning and substitutes the default instead of failing the
    /// request.
    fn resolve_ocr(&self) -> Box<dyn OcrProvider> {
        let kind = match OCR_PROVIDERS.get(self.config.ocr_provider.as_str()) {
            Some(kind) => *kind,
            None => {
                warn!(
                    "unknown OCR provider '{}', using default 'qwen7b'",
                    self.config.ocr_provider
                );
                DEFAULT_OCR
            }
        };

        match kind {
            OcrKind::Read => Box::new(ReadOcr::new(&self.config)),
            OcrKind::Predict { id, model } => Box::new(PredictOcr::new(&self.config, id, model)),
        }
    }

    /// Returns a fresh instance of the active evaluation provider, with the
    /// same unknown-id fallback behavior as `resolve_ocr`.
    fn resolve_evaluator(&self) -> Box<dyn EvaluationProvider> {
        let kind = match EVAL_PROVIDERS.get(self.config.eval_provider.as_str()) {
            Some(kind) => *kind,
            None => {
                warn!(
                    "unknown evaluation provider '{}', using default 'openai'",
                    self.config.eval_provider
                );
                DEFAULT_EVAL
            }
        };

        match kind {
            EvalKind::Cloud => Box::new(CloudChatEvaluator::new(&self.config)),
            EvalKind::Gateway => Box::new(GatewayChatEvaluator::new(&self.config)),
            EvalKind::Generate => Box::new(GenerateEvaluator::new(&self.config)),
        }
    }
}
