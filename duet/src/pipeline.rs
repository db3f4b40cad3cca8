//! Orchestration of the two-stage generation pipeline.
//!
//! Stage 1 (the processor) answers the user and drafts a refined prompt
//! behind a fixed marker; stage 2 (the responder) consumes only that
//! refined prompt. The stages are strictly sequential, and generation
//! failures are captured per stage as data, never thrown across this
//! boundary: callers always receive a well-formed outcome.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::core::handoff::extract_handoff;
use crate::core::ops_scan::parse_operations;
use crate::core::types::{
    ExecutionRecord, PipelineOutcome, StageOutcome, StageResult, StageRole,
};
use crate::io::apply::apply_operation;
use crate::io::generate::{GenRequest, Generator};
use crate::io::project::structure_summary;
use crate::io::prompt::{PromptBuilder, processor_system, render_file_context};
use crate::io::store::ContentStore;

/// Result of a pipeline run that may have applied file operations.
#[derive(Debug)]
pub struct ExecutionReport {
    pub outcome: PipelineOutcome,
    /// One record per parsed operation, in execution order: all of
    /// stage 1's operations, then all of stage 2's.
    pub records: Vec<ExecutionRecord>,
    pub auto_executed: bool,
}

/// Two-stage assistant over a project directory.
pub struct Assistant<'a> {
    processor: &'a dyn Generator,
    responder: &'a dyn Generator,
    store: ContentStore,
    prompts: PromptBuilder,
}

impl<'a> Assistant<'a> {
    pub fn new(
        processor: &'a dyn Generator,
        responder: &'a dyn Generator,
        store: ContentStore,
    ) -> Self {
        Self {
            processor,
            responder,
            store,
            prompts: PromptBuilder::new(),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Run both stages: processor first, then the responder on the
    /// extracted hand-off payload.
    ///
    /// A processor failure short-circuits hard: the responder is never
    /// invoked and stage 2 reports a synthetic skip. There are no retries.
    pub fn run_pipeline(&self, query: &str) -> PipelineOutcome {
        let stage1 = self.call_processor(query);
        let Some(stage1_text) = stage1.text() else {
            warn!("processor stage failed, skipping responder");
            let stage2 = StageResult::skipped(
                self.responder.model_id(),
                "skipped due to processor error",
            );
            return PipelineOutcome { stage1, stage2 };
        };

        // The responder sees only the extracted payload, never the marker
        // or the stage-1 framing around it.
        let payload = extract_handoff(stage1_text).to_string();
        let stage2 = self.call_responder(&payload);
        PipelineOutcome { stage1, stage2 }
    }

    /// Degenerate one-call path: processor only.
    pub fn run_stage1_only(&self, query: &str) -> StageResult {
        self.call_processor(query)
    }

    /// Degenerate one-call path: responder only, fed the raw query with no
    /// hand-off extraction.
    pub fn run_stage2_only(&self, query: &str) -> StageResult {
        self.call_responder(query)
    }

    /// Run the pipeline with file snapshots and the project structure
    /// prepended to the query.
    pub fn run_with_file_context(&self, query: &str, files: &[String]) -> PipelineOutcome {
        let enhanced = self.prompts.build_context_query(
            query,
            &render_file_context(&self.store, files),
            &structure_summary(self.store.base()),
        );
        self.run_pipeline(&enhanced)
    }

    /// Code-generation entry point: adds the operation-markup instructions
    /// to the prompt, runs the pipeline, and — when `auto_execute` —
    /// applies the operations found in each stage's text.
    ///
    /// Both stages are always scanned; a stage without recognizable markup
    /// simply contributes zero records.
    pub fn run_with_execution(
        &self,
        query: &str,
        files: &[String],
        auto_execute: bool,
    ) -> ExecutionReport {
        let enhanced = self.prompts.build_code_query(
            query,
            &render_file_context(&self.store, files),
            &structure_summary(self.store.base()),
        );
        let outcome = self.run_pipeline(&enhanced);

        let mut records = Vec::new();
        if auto_execute {
            for (source, stage) in [
                (StageRole::Processor, &outcome.stage1),
                (StageRole::Responder, &outcome.stage2),
            ] {
                let Some(text) = stage.text() else { continue };
                records.extend(self.apply_stage_operations(source, text));
            }
        }

        ExecutionReport {
            outcome,
            records,
            auto_executed: auto_execute,
        }
    }

    fn apply_stage_operations(&self, source: StageRole, text: &str) -> Vec<ExecutionRecord> {
        let operations = parse_operations(text);
        debug!(
            source = source.as_str(),
            count = operations.len(),
            "parsed operations"
        );
        operations
            .into_iter()
            .map(|operation| {
                let outcome = apply_operation(&self.store, &operation);
                ExecutionRecord {
                    source,
                    operation,
                    outcome,
                }
            })
            .collect()
    }

    fn call_processor(&self, query: &str) -> StageResult {
        info!(model = self.processor.model_id(), "calling processor stage");
        call_stage(
            self.processor,
            &GenRequest {
                system: Some(processor_system()),
                prompt: query,
            },
        )
    }

    fn call_responder(&self, payload: &str) -> StageResult {
        info!(model = self.responder.model_id(), "calling responder stage");
        call_stage(
            self.responder,
            &GenRequest {
                system: None,
                prompt: payload,
            },
        )
    }
}

/// Invoke one generator, folding its result and elapsed time into a
/// [`StageResult`].
fn call_stage(generator: &dyn Generator, request: &GenRequest<'_>) -> StageResult {
    let start = Instant::now();
    let outcome = match generator.generate(request) {
        Ok(text) => StageOutcome::Text(text),
        Err(err) => {
            warn!(model = generator.model_id(), err = %err, "generation failed");
            StageOutcome::Error(err.to_string())
        }
    };
    StageResult {
        model_id: generator.model_id().to_string(),
        elapsed: start.elapsed(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::generate::GenerateError;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    struct FakeGenerator {
        model: &'static str,
        reply: Result<String, String>,
        calls: Cell<usize>,
        last_prompt: RefCell<Option<String>>,
        last_system: RefCell<Option<String>>,
    }

    impl FakeGenerator {
        fn ok(model: &'static str, text: &str) -> Self {
            Self {
                model,
                reply: Ok(text.to_string()),
                calls: Cell::new(0),
                last_prompt: RefCell::new(None),
                last_system: RefCell::new(None),
            }
        }

        fn failing(model: &'static str, message: &str) -> Self {
            Self {
                model,
                reply: Err(message.to_string()),
                calls: Cell::new(0),
                last_prompt: RefCell::new(None),
                last_system: RefCell::new(None),
            }
        }
    }

    impl Generator for FakeGenerator {
        fn model_id(&self) -> &str {
            self.model
        }

        fn generate(&self, request: &GenRequest<'_>) -> Result<String, GenerateError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_prompt.borrow_mut() = Some(request.prompt.to_string());
            *self.last_system.borrow_mut() = request.system.map(str::to_string);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(GenerateError::Api {
                    status: 500,
                    message: message.clone(),
                }),
            }
        }
    }

    fn assistant<'a>(
        processor: &'a FakeGenerator,
        responder: &'a FakeGenerator,
        base: &std::path::Path,
    ) -> Assistant<'a> {
        Assistant::new(processor, responder, ContentStore::new(base))
    }

    /// Verifies a processor failure short-circuits: stage 2 is a synthetic
    /// skip and the responder is never invoked.
    #[test]
    fn processor_failure_skips_responder() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::failing("proc-model", "boom");
        let responder = FakeGenerator::ok("resp-model", "unused");
        let assistant = assistant(&processor, &responder, temp.path());

        let outcome = assistant.run_pipeline("question");

        assert_eq!(responder.calls.get(), 0);
        assert!(!outcome.stage1.is_ok());
        assert_eq!(
            outcome.stage2.error_message(),
            Some("skipped due to processor error")
        );
        assert_eq!(outcome.stage2.elapsed, Duration::ZERO);
        assert_eq!(outcome.stage2.model_id, "resp-model");
    }

    /// Verifies the responder receives exactly the trimmed text after the
    /// hand-off marker, with no stage-1 framing.
    #[test]
    fn responder_receives_extracted_payload() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::ok(
            "proc-model",
            "answer\n---PROMPT FOR GEMINI---\nrefined prompt",
        );
        let responder = FakeGenerator::ok("resp-model", "done");
        let assistant = assistant(&processor, &responder, temp.path());

        let outcome = assistant.run_pipeline("question");

        assert!(outcome.stage1.is_ok());
        assert!(outcome.stage2.is_ok());
        assert_eq!(responder.calls.get(), 1);
        assert_eq!(
            responder.last_prompt.borrow().as_deref(),
            Some("refined prompt")
        );
        assert_eq!(*responder.last_system.borrow(), None);
    }

    /// Verifies the whole stage-1 text is forwarded when the marker is
    /// absent (fallback, not an error).
    #[test]
    fn missing_marker_forwards_full_text() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::ok("proc-model", "plain answer without marker");
        let responder = FakeGenerator::ok("resp-model", "done");
        let assistant = assistant(&processor, &responder, temp.path());

        assistant.run_pipeline("question");

        assert_eq!(
            responder.last_prompt.borrow().as_deref(),
            Some("plain answer without marker")
        );
    }

    #[test]
    fn processor_receives_role_instruction() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::ok("proc-model", "hi");
        let responder = FakeGenerator::ok("resp-model", "done");
        let assistant = assistant(&processor, &responder, temp.path());

        assistant.run_pipeline("question");

        let system = processor.last_system.borrow();
        assert!(system.as_deref().is_some_and(|s| s.contains("---PROMPT FOR GEMINI---")));
    }

    #[test]
    fn stage2_only_passes_raw_query() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::ok("proc-model", "unused");
        let responder = FakeGenerator::ok("resp-model", "done");
        let assistant = assistant(&processor, &responder, temp.path());

        let result = assistant.run_stage2_only("raw question");

        assert_eq!(processor.calls.get(), 0);
        assert_eq!(
            responder.last_prompt.borrow().as_deref(),
            Some("raw question")
        );
        assert!(result.is_ok());
    }

    /// Verifies operations from both stages execute, tagged with their
    /// source, stage 1's before stage 2's.
    #[test]
    fn execution_applies_operations_from_both_stages() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::ok(
            "proc-model",
            "<CREATE file=\"from_stage1.txt\">\nalpha\n</CREATE>",
        );
        let responder = FakeGenerator::ok(
            "resp-model",
            "<CREATE file=\"from_stage2.txt\">\nbeta\n</CREATE>",
        );
        let assistant = assistant(&processor, &responder, temp.path());

        let report = assistant.run_with_execution("make files", &[], true);

        assert!(report.auto_executed);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].source, StageRole::Processor);
        assert_eq!(report.records[1].source, StageRole::Responder);
        assert!(report.records.iter().all(|r| r.outcome.is_applied()));
        assert_eq!(
            assistant.store().read("from_stage1.txt").expect("read"),
            "alpha"
        );
        assert_eq!(
            assistant.store().read("from_stage2.txt").expect("read"),
            "beta"
        );
    }

    /// A stage without markup yields zero records, not an error.
    #[test]
    fn stage_without_operations_contributes_no_records() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = FakeGenerator::ok("proc-model", "prose only");
        let responder = FakeGenerator::ok("resp-model", "also prose");
        let assistant = assistant(&processor, &responder, temp.path());

        let report = assistant.run_with_execution("question", &[], true);
        assert!(report.records.is_empty());
        assert!(report.outcome.stage1.is_ok());
    }

    #[test]
    fn auto_execute_false_parses_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor =
            FakeGenerator::ok("proc-model", "<CREATE file=\"x.txt\">\nbody\n</CREATE>");
        let responder = FakeGenerator::ok("resp-model", "ok");
        let assistant = assistant(&processor, &responder, temp.path());

        let report = assistant.run_with_execution("question", &[], false);
        assert!(!report.auto_executed);
        assert!(report.records.is_empty());
        assert!(!temp.path().join("x.txt").exists());
    }

    /// A failing operation is recorded and the remaining operations still
    /// run.
    #[test]
    fn failed_operation_does_not_abort_the_rest() {
        let temp = tempfile::tempdir().expect("tempdir");
        let text = concat!(
            "<MODIFY file=\"missing.txt\" operation=\"replace\" search=\"a\" with=\"b\"></MODIFY>\n",
            "<CREATE file=\"after.txt\">\nstill runs\n</CREATE>\n",
        );
        let processor = FakeGenerator::ok("proc-model", text);
        let responder = FakeGenerator::ok("resp-model", "no ops here");
        let assistant = assistant(&processor, &responder, temp.path());

        let report = assistant.run_with_execution("question", &[], true);

        assert_eq!(report.records.len(), 2);
        assert!(!report.records[0].outcome.is_applied());
        assert!(report.records[1].outcome.is_applied());
        assert_eq!(
            assistant.store().read("after.txt").expect("read"),
            "still runs"
        );
    }

    /// File context and structure are prepended ahead of the pipeline run.
    #[test]
    fn file_context_reaches_the_processor() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(temp.path());
        store.write("src/lib.rs", "pub fn x() {}\n").expect("write");

        let processor = FakeGenerator::ok("proc-model", "ok");
        let responder = FakeGenerator::ok("resp-model", "ok");
        let assistant = Assistant::new(&processor, &responder, store);

        assistant.run_with_file_context("explain", &["src/lib.rs".to_string()]);

        let prompt = processor.last_prompt.borrow().clone().expect("prompt");
        assert!(prompt.starts_with("explain"));
        assert!(prompt.contains("=== RELEVANT FILES ==="));
        assert!(prompt.contains("pub fn x() {}"));
        assert!(prompt.contains("=== PROJECT STRUCTURE ==="));
        assert!(prompt.contains("lib.rs"));
    }
}
