//! Hand-off extraction between the two pipeline stages.
//!
//! The processor is instructed to write its user-facing answer first, then a
//! refined prompt for the responder behind a fixed marker line. The
//! responder must only ever see the refined prompt, never the marker or the
//! stage-1 framing.

/// Fixed marker separating the user-facing answer from the stage-2 prompt
/// in processor output.
pub const HANDOFF_MARKER: &str = "---PROMPT FOR GEMINI---";

/// Extract the stage-2 prompt from processor text.
///
/// Everything after the last marker occurrence, trimmed. Text without the
/// marker is passed through whole; the missing marker is a fallback, not an
/// error.
pub fn extract_handoff(stage1_text: &str) -> &str {
    match stage1_text.rfind(HANDOFF_MARKER) {
        Some(idx) => stage1_text[idx + HANDOFF_MARKER.len()..].trim(),
        None => stage1_text,
    }
}

/// Split processor text for display: the user-facing answer and, when the
/// marker is present, the drafted responder prompt.
pub fn split_answer(stage1_text: &str) -> (&str, Option<&str>) {
    match stage1_text.split_once(HANDOFF_MARKER) {
        Some((answer, prompt)) => (answer.trim(), Some(prompt.trim())),
        None => (stage1_text.trim(), None),
    }
}
