//! Cleanup of OCR output before it is persisted

/// Strips NUL characters from extracted text. Some OCR backends leak them
/// and they break persistence in the storage collaborator.
pub fn sanitize_text(text: &str) -> String {
    text.replace('\0', "")
}
