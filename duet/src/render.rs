//! Console rendering for pipeline results.
//!
//! Pure string assembly: stdout printing stays in `main` and the
//! interactive loop, diagnostics stay on stderr via tracing.

use std::fmt::Write as _;

use crate::core::handoff::split_answer;
use crate::core::types::{ExecutionOutcome, ExecutionRecord, PipelineOutcome, StageResult};
use crate::pipeline::ExecutionReport;

/// Render both stage panels with timings.
///
/// Stage-1 text is split at the hand-off marker so the user sees the answer
/// and the drafted responder prompt as separate blocks.
pub fn render_outcome(outcome: &PipelineOutcome) -> String {
    let mut buf = String::new();

    write_stage_header(&mut buf, "Stage 1: processor", &outcome.stage1);
    match outcome.stage1.text() {
        Some(text) => {
            let (answer, prompt) = split_answer(text);
            let _ = writeln!(buf, "{answer}");
            if let Some(prompt) = prompt {
                let _ = writeln!(buf, "\n-- drafted responder prompt --\n{prompt}");
            }
        }
        None => {
            let _ = writeln!(
                buf,
                "error: {}",
                outcome.stage1.error_message().unwrap_or("unknown")
            );
        }
    }

    let _ = writeln!(buf);
    write_stage_header(&mut buf, "Stage 2: responder", &outcome.stage2);
    match outcome.stage2.text() {
        Some(text) => {
            let _ = writeln!(buf, "{}", text.trim());
        }
        None => {
            let _ = writeln!(
                buf,
                "error: {}",
                outcome.stage2.error_message().unwrap_or("unknown")
            );
        }
    }

    let _ = writeln!(
        buf,
        "\nresponse times: processor {:.2}s | responder {:.2}s",
        outcome.stage1.elapsed.as_secs_f64(),
        outcome.stage2.elapsed.as_secs_f64()
    );
    buf
}

/// Render the pipeline panels plus the file-operation section.
pub fn render_report(report: &ExecutionReport) -> String {
    let mut buf = render_outcome(&report.outcome);
    if !report.auto_executed {
        return buf;
    }

    let _ = writeln!(buf);
    if report.records.is_empty() {
        let _ = writeln!(buf, "no file operations detected in either response");
        return buf;
    }

    let _ = writeln!(buf, "file operations:");
    for record in &report.records {
        let _ = writeln!(buf, "{}", render_record(record));
    }

    let succeeded = report
        .records
        .iter()
        .filter(|record| record.outcome.is_applied())
        .count();
    let failed = report.records.len() - succeeded;
    let _ = writeln!(buf, "{succeeded} succeeded, {failed} failed");
    buf
}

fn render_record(record: &ExecutionRecord) -> String {
    let prefix = format!(
        "  [{}] {} {}",
        record.source.as_str(),
        record.operation.kind(),
        record.operation.path()
    );
    match &record.outcome {
        ExecutionOutcome::Applied { stats } => {
            format!("{prefix} -> ok ({} bytes, {} lines)", stats.bytes, stats.lines)
        }
        ExecutionOutcome::Failed { message } => format!("{prefix} -> failed: {message}"),
    }
}

fn write_stage_header(buf: &mut String, title: &str, result: &StageResult) {
    let _ = writeln!(buf, "=== {title} ({}) ===", result.model_id);
}
