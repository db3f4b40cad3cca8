//! Prompt assembly for the two pipeline stages.
//!
//! Templates are embedded at compile time and rendered with minijinja.
//! Everything here is plain string assembly; the orchestrator decides what
//! reaches which model.

use minijinja::{Environment, context};

use crate::io::store::ContentStore;

const PROCESSOR_SYSTEM: &str = include_str!("prompts/processor.md");
const CONTEXT_TEMPLATE: &str = include_str!("prompts/context_mode.md");
const CODE_TEMPLATE: &str = include_str!("prompts/code_mode.md");

/// Fixed role instruction for the stage-1 processor.
pub fn processor_system() -> &'static str {
    PROCESSOR_SYSTEM
}

/// Template engine wrapper around minijinja.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("context", CONTEXT_TEMPLATE)
            .expect("context template should be valid");
        env.add_template("code", CODE_TEMPLATE)
            .expect("code template should be valid");
        Self { env }
    }

    /// Query plus file snapshots and project structure, without operation
    /// instructions.
    pub fn build_context_query(&self, query: &str, file_context: &str, structure: &str) -> String {
        self.render("context", query, file_context, structure)
    }

    /// Code-generation prompt: context plus the file-operation markup
    /// instructions.
    pub fn build_code_query(&self, query: &str, file_context: &str, structure: &str) -> String {
        self.render("code", query, file_context, structure)
    }

    fn render(&self, name: &str, query: &str, file_context: &str, structure: &str) -> String {
        let template = self
            .env
            .get_template(name)
            .expect("template should be registered");
        template
            .render(context! {
                query => query.trim(),
                file_context => (!file_context.trim().is_empty()).then(|| file_context.trim_end()),
                structure => structure,
            })
            .expect("prompt template rendering should not fail")
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized snapshot of requested files for the prompt preamble.
///
/// Unreadable files are reported inline rather than failing the whole
/// prompt; the model may still act on the rest.
pub fn render_file_context(store: &ContentStore, files: &[String]) -> String {
    if files.is_empty() {
        return String::new();
    }
    let mut buf = String::from("=== RELEVANT FILES ===\n");
    for rel in files {
        match store.read(rel) {
            Ok(content) => buf.push_str(&format!("\n--- {rel} ---\n{content}\n")),
            Err(err) => buf.push_str(&format!("\n--- {rel} (unreadable) ---\n{err:#}\n")),
        }
    }
    buf
}
