//! Project structure summary and text search.
//!
//! Both functions produce plain data for prompt preambles and the
//! interactive `show files` command; neither holds state.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::RegexBuilder;
use tracing::{debug, warn};

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &[".git", "target", "node_modules", "__pycache__"];
/// Dot entries that are still worth listing.
const KEEP_DOTFILES: &[&str] = &[".env", ".gitignore"];
/// Extensions searched by [`search_files`].
const SEARCH_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "html", "css", "json", "toml", "txt", "md", "yml", "yaml",
];
const MAX_DEPTH: usize = 3;

/// One matching line from a project search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Path relative to the project root.
    pub file: String,
    /// 1-indexed line number.
    pub line_number: usize,
    pub line: String,
}

/// Render a bounded-depth tree of the project as indented text.
///
/// Entries are sorted by name so the summary is deterministic for a given
/// tree state.
pub fn structure_summary(base: &Path) -> String {
    let mut lines = Vec::new();
    scan_dir(base, 0, &mut lines);
    lines.join("\n")
}

fn scan_dir(dir: &Path, depth: usize, lines: &mut Vec<String>) {
    if depth > MAX_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        warn!(dir = %dir.display(), "cannot read directory");
        return;
    };
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') && !KEEP_DOTFILES.contains(&name.as_str()) {
            continue;
        }
        let indent = "  ".repeat(depth);
        let path = entry.path();
        if path.is_dir() {
            if SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            lines.push(format!("{indent}{name}/"));
            scan_dir(&path, depth + 1, lines);
        } else {
            let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
            lines.push(format!("{indent}{name} ({size} bytes)"));
        }
    }
}

/// Case-insensitive literal search across known text files.
pub fn search_files(base: &Path, pattern: &str) -> Result<Vec<SearchHit>> {
    let matcher = RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(true)
        .build()
        .context("build search pattern")?;
    let mut hits = Vec::new();
    walk_files(base, base, &matcher, &mut hits);
    Ok(hits)
}

fn walk_files(base: &Path, dir: &Path, matcher: &regex::Regex, hits: &mut Vec<SearchHit>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if path.is_dir() {
            if name.starts_with('.') || SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            walk_files(base, &path, matcher, hits);
            continue;
        }
        if !has_search_extension(&path) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            debug!(file = %path.display(), "skipping unreadable file");
            continue;
        };
        let rel = path
            .strip_prefix(base)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        for (idx, line) in contents.lines().enumerate() {
            if matcher.is_match(line) {
                hits.push(SearchHit {
                    file: rel.clone(),
                    line_number: idx + 1,
                    line: line.trim().to_string(),
                });
            }
        }
    }
}

fn has_search_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SEARCH_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
