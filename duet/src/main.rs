//! Two-stage dual-model assistant CLI.
//!
//! Queries a processor model and a responder model in a fixed pipeline and
//! can apply file operations the models describe in an embedded markup.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use duet::config::load_config;
use duet::io::gemini::GeminiGenerator;
use duet::io::openai::OpenAiGenerator;
use duet::io::store::ContentStore;
use duet::pipeline::Assistant;
use duet::{interactive, logging, render};

#[derive(Parser)]
#[command(
    name = "duet",
    version,
    about = "Two-stage dual-model assistant with project file operations"
)]
struct Cli {
    /// Question or request for the pipeline.
    query: Option<String>,

    /// Start an interactive session.
    #[arg(short, long)]
    interactive: bool,

    /// Code-generation mode: include project context and apply file
    /// operations found in responses.
    #[arg(short, long)]
    code: bool,

    /// Project directory the assistant operates on.
    #[arg(short, long, default_value = ".")]
    project_path: PathBuf,

    /// Files to include as prompt context (repeatable).
    #[arg(short, long)]
    files: Vec<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init(cli.verbose);

    let config = load_config(&cli.project_path.join("duet.toml"))?;
    tracing::info!(config = %config.summarize(), "configuration loaded");

    if !config.api_keys_configured() {
        bail!(
            "API keys not configured; set OPENAI_API_KEY and GEMINI_API_KEY \
             in the environment or a .env file"
        );
    }

    let processor = OpenAiGenerator::from_config(&config);
    let responder = GeminiGenerator::from_config(&config);
    let store = ContentStore::new(&cli.project_path);
    let assistant = Assistant::new(&processor, &responder, store);

    if cli.interactive {
        return interactive::run(&assistant, cli.code);
    }

    let Some(query) = cli.query else {
        println!("usage: duet \"your question\"");
        println!("       duet --interactive");
        println!("       duet --code \"generate a module for user management\"");
        println!("       duet --code --files src/main.rs \"add error handling\"");
        return Ok(());
    };

    if cli.code {
        let report = assistant.run_with_execution(&query, &cli.files, true);
        print!("{}", render::render_report(&report));
    } else {
        let outcome = if cli.files.is_empty() {
            assistant.run_pipeline(&query)
        } else {
            assistant.run_with_file_context(&query, &cli.files)
        };
        print!("{}", render::render_outcome(&outcome));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_query() {
        let cli = Cli::parse_from(["duet", "what is rust"]);
        assert_eq!(cli.query.as_deref(), Some("what is rust"));
        assert!(!cli.interactive);
        assert!(!cli.code);
    }

    #[test]
    fn parse_code_mode_with_files() {
        let cli = Cli::parse_from([
            "duet",
            "--code",
            "--files",
            "src/main.rs",
            "--files",
            "src/lib.rs",
            "refactor",
        ]);
        assert!(cli.code);
        assert_eq!(cli.files, vec!["src/main.rs", "src/lib.rs"]);
    }

    #[test]
    fn parse_interactive_defaults_project_path() {
        let cli = Cli::parse_from(["duet", "-i"]);
        assert!(cli.interactive);
        assert_eq!(cli.project_path, PathBuf::from("."));
    }
}
