//! Shared deterministic types for the pipeline core.
//!
//! These types define stable contracts between the orchestrator, the
//! operation scanner, and the operation executor. Success and failure are
//! separate enum variants, so every consumer pattern-matches instead of
//! probing for field presence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which pipeline stage produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageRole {
    /// Stage 1: answers the user and drafts the hand-off prompt.
    Processor,
    /// Stage 2: consumes the hand-off prompt.
    Responder,
}

impl StageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StageRole::Processor => "processor",
            StageRole::Responder => "responder",
        }
    }
}

/// Outcome of one generation call: text or a captured error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Text(String),
    Error(String),
}

/// Result of a single generation call.
///
/// `elapsed` is measured around the outbound call and is zero only for
/// synthetic results that never reached a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub model_id: String,
    pub elapsed: Duration,
    pub outcome: StageOutcome,
}

impl StageResult {
    /// Synthetic result for a stage that was never invoked.
    pub fn skipped(model_id: &str, reason: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            elapsed: Duration::ZERO,
            outcome: StageOutcome::Error(reason.to_string()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Text(text) => Some(text),
            StageOutcome::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Text(_) => None,
            StageOutcome::Error(message) => Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, StageOutcome::Text(_))
    }
}

/// Paired results of the two-stage pipeline.
///
/// If `stage1` carries an error, `stage2` is a synthetic skip and the
/// responder was never called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub stage1: StageResult,
    pub stage2: StageResult,
}

/// A parsed file mutation from generated text.
///
/// `path` is always non-empty: tags without an extractable path are dropped
/// by the scanner instead of being emitted degenerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileOperation {
    Create {
        path: String,
        content: String,
    },
    ModifyAppend {
        path: String,
        content: String,
    },
    ModifyReplace {
        path: String,
        search: String,
        replace: String,
    },
}

impl FileOperation {
    pub fn path(&self) -> &str {
        match self {
            FileOperation::Create { path, .. }
            | FileOperation::ModifyAppend { path, .. }
            | FileOperation::ModifyReplace { path, .. } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FileOperation::Create { .. } => "create",
            FileOperation::ModifyAppend { .. } => "append",
            FileOperation::ModifyReplace { .. } => "replace",
        }
    }
}

/// Byte and line accounting for a completed whole-file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStats {
    pub path: String,
    pub bytes: usize,
    pub lines: usize,
}

/// Outcome of executing one parsed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Applied { stats: WriteStats },
    Failed { message: String },
}

impl ExecutionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ExecutionOutcome::Applied { .. })
    }
}

/// Audit entry pairing a parsed operation with its execution outcome and
/// the stage whose text produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub source: StageRole,
    pub operation: FileOperation,
    pub outcome: ExecutionOutcome,
}
