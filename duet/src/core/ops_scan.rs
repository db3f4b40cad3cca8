//! Line scanner for the embedded file-operation markup.
//!
//! Generated text may carry `<CREATE>`/`<MODIFY>` tags describing file
//! mutations. The scanner is a single left-to-right pass over lines with an
//! explicit state value threaded through a pure step function; it never
//! backtracks past a consumed line. Malformed or unterminated blocks are
//! dropped without error: the input is model output, and a partial block
//! must never produce a partial write.

use crate::core::types::FileOperation;

const CREATE_OPEN: &str = "<CREATE file=\"";
const CREATE_CLOSE: &str = "</CREATE>";
const MODIFY_OPEN: &str = "<MODIFY file=\"";
const MODIFY_CLOSE: &str = "</MODIFY>";

/// Scanner state carried between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    /// Looking for an opening tag; all other lines are ignored.
    Scan,
    /// Inside a `<CREATE>` block, collecting content lines verbatim.
    CaptureCreate { path: String, lines: Vec<String> },
    /// Inside a `<MODIFY operation="append">` block.
    CaptureAppend { path: String, lines: Vec<String> },
}

/// Parse every recognizable file operation out of free-form text, in
/// order of appearance.
///
/// Text without any tags yields an empty list; the `<FILE_OPERATIONS>`
/// wrapper is not required and is ignored when present.
pub fn parse_operations(text: &str) -> Vec<FileOperation> {
    let mut out = Vec::new();
    let mut state = ScanState::Scan;
    for line in text.lines() {
        state = step(state, line, &mut out);
    }
    // A block still open at end of text is dropped wholesale rather than
    // emitted half-captured.
    out
}

/// Advance the scanner by one line, possibly emitting an operation.
fn step(state: ScanState, line: &str, out: &mut Vec<FileOperation>) -> ScanState {
    match state {
        ScanState::Scan => scan_line(line, out),
        ScanState::CaptureCreate { path, mut lines } => {
            if line.trim().starts_with(CREATE_CLOSE) {
                out.push(FileOperation::Create {
                    path,
                    content: join_block(&lines),
                });
                ScanState::Scan
            } else {
                lines.push(line.to_string());
                ScanState::CaptureCreate { path, lines }
            }
        }
        ScanState::CaptureAppend { path, mut lines } => {
            if line.trim().starts_with(MODIFY_CLOSE) {
                out.push(FileOperation::ModifyAppend {
                    path,
                    content: join_block(&lines),
                });
                ScanState::Scan
            } else {
                lines.push(line.to_string());
                ScanState::CaptureAppend { path, lines }
            }
        }
    }
}

fn scan_line(line: &str, out: &mut Vec<FileOperation>) -> ScanState {
    let trimmed = line.trim();

    if trimmed.starts_with(CREATE_OPEN) {
        return match extract_path(trimmed) {
            Some(path) => ScanState::CaptureCreate {
                path,
                lines: Vec::new(),
            },
            None => ScanState::Scan,
        };
    }

    if trimmed.starts_with(MODIFY_OPEN) {
        let Some(path) = extract_path(trimmed) else {
            return ScanState::Scan;
        };
        match attr_value(trimmed, "operation=\"").unwrap_or("append") {
            "append" => {
                return ScanState::CaptureAppend {
                    path,
                    lines: Vec::new(),
                };
            }
            "replace" => {
                // Single-line construct: no body capture.
                out.push(FileOperation::ModifyReplace {
                    path,
                    search: attr_value(trimmed, "search=\"").unwrap_or("").to_string(),
                    replace: attr_value(trimmed, "with=\"").unwrap_or("").to_string(),
                });
            }
            // Unknown operation values are ignored, not errors.
            _ => {}
        }
    }

    ScanState::Scan
}

/// Extract a usable `file` attribute; a tag with no path is dropped.
fn extract_path(line: &str) -> Option<String> {
    attr_value(line, "file=\"")
        .filter(|path| !path.is_empty())
        .map(str::to_string)
}

/// Substring attribute extraction: the text after the key's opening quote,
/// up to the next quote (or the rest of the line when the closing quote is
/// missing). Values cannot contain a literal quote; they truncate at it.
fn attr_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    Some(match rest.find('"') {
        Some(end) => &rest[..end],
        None => rest,
    })
}

/// Join captured lines, stripping trailing newlines from the block.
fn join_block(lines: &[String]) -> String {
    let joined = lines.join("\n");
    joined.trim_end_matches('\n').to_string()
}
