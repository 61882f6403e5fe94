//! Grade extraction from free-form evaluator text
//!
//! The prompt instructs every evaluator to end its response with the literal
//! `Nota: n/10` marker. This module pulls the number back out:
//!
//! 1. Marker first: the text right after `Nota:` (a space before the colon
//!    is tolerated) up to the next `/`, trimmed and parsed as a float.
//! 2. Fallback: the first `<number>/10` occurrence anywhere in the text.
//!
//! Extraction is total. A parse miss yields `0.0`, which is a documented
//! fallback, not an error; callers that need to tell a real zero apart from
//! a miss use [`try_extract`]. No clamping happens here.

use std::sync::OnceLock;

use regex::Regex;

/// Accepted spellings of the grade marker, in order of precedence
const MARKERS: [&str; 2] = ["Nota:", "Nota :"];

/// Compiled `<number>/10` fallback pattern
fn fallback_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+\.?\d*)\s*/\s*10").expect("valid fallback regex"))
}

/// Extracts the grade, or `None` when no parseable marker or pattern exists.
///
/// When the `Nota:` marker is present but the value after it does not parse,
/// the result is `None` rather than a regex rescan; the marker is the
/// authoritative spot and a broken one means the evaluator ignored the
/// output contract.
pub fn try_extract(text: &str) -> Option<f64> {
    if let Some(raw) = marker_value(text) {
        return raw.trim().parse::<f64>().ok();
    }

    fallback_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Total extraction: any parse failure yields `0.0`
pub fn extract(text: &str) -> f64 {
    try_extract(text).unwrap_or(0.0)
}

/// Returns the raw text between the marker and the next `/`, if any marker
/// is present
fn marker_value(text: &str) -> Option<&str> {
    for marker in MARKERS {
        if let Some(idx) = text.find(marker) {
            let rest = &text[idx + marker.len()..];
            return Some(rest.split('/').next().unwrap_or(rest));
        }
    }
    None
}
