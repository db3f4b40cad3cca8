//! Interactive shell over stdin.
//!
//! One query per line; `show files` prints project and git state, `find
//! <pattern>` searches project text files; `quit`, `exit`, or `q` (or end
//! of input) leaves the loop.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use crate::io::git::Git;
use crate::io::project::{search_files, structure_summary};
use crate::pipeline::Assistant;
use crate::render;

/// Classified form of one line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Quit,
    ShowFiles,
    Find(&'a str),
    Query(&'a str),
    Empty,
}

/// Classify one line of user input.
pub fn classify(line: &str) -> ReplCommand<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    if let Some(pattern) = trimmed.strip_prefix("find ") {
        let pattern = pattern.trim();
        if !pattern.is_empty() {
            return ReplCommand::Find(pattern);
        }
    }
    match trimmed.to_lowercase().as_str() {
        "quit" | "exit" | "q" => ReplCommand::Quit,
        "show files" => ReplCommand::ShowFiles,
        _ => ReplCommand::Query(trimmed),
    }
}

/// Run the interactive loop until quit or end of input.
pub fn run(assistant: &Assistant<'_>, code_mode: bool) -> Result<()> {
    let mode = if code_mode {
        "code generation mode: file operations in responses will be applied"
    } else {
        "interactive mode"
    };
    println!("duet {mode}");
    println!("commands: 'show files', 'find <pattern>', 'quit'");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("\n> ");
        stdout.flush().context("flush prompt")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("read from stdin")?;
        if read == 0 {
            // End of input behaves like quit.
            println!();
            return Ok(());
        }

        match classify(&line) {
            ReplCommand::Quit => return Ok(()),
            ReplCommand::Empty => println!("please enter a question"),
            ReplCommand::ShowFiles => {
                println!("project: {}", assistant.store().base().display());
                println!("{}", Git::new(assistant.store().base()).info().summary());
                println!("{}", structure_summary(assistant.store().base()));
            }
            ReplCommand::Find(pattern) => {
                let hits = search_files(assistant.store().base(), pattern)?;
                if hits.is_empty() {
                    println!("no matches for '{pattern}'");
                }
                for hit in hits {
                    println!("{}:{}: {}", hit.file, hit.line_number, hit.line);
                }
            }
            ReplCommand::Query(query) => {
                if code_mode {
                    let report = assistant.run_with_execution(query, &[], true);
                    print!("{}", render::render_report(&report));
                } else {
                    let outcome = assistant.run_pipeline(query);
                    print!("{}", render::render_outcome(&outcome));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_quit_words() {
        assert_eq!(classify("quit"), ReplCommand::Quit);
        assert_eq!(classify("  EXIT  "), ReplCommand::Quit);
        assert_eq!(classify("q"), ReplCommand::Quit);
    }

    #[test]
    fn classifies_show_files() {
        assert_eq!(classify("show files"), ReplCommand::ShowFiles);
        assert_eq!(classify("Show Files"), ReplCommand::ShowFiles);
    }

    #[test]
    fn classifies_find_with_pattern() {
        assert_eq!(classify("find needle"), ReplCommand::Find("needle"));
        // A bare `find` is just a question.
        assert_eq!(classify("find"), ReplCommand::Query("find"));
    }

    #[test]
    fn classifies_queries_trimmed() {
        assert_eq!(
            classify("  what is this repo?  \n"),
            ReplCommand::Query("what is this repo?")
        );
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(classify("   \n"), ReplCommand::Empty);
    }
}
