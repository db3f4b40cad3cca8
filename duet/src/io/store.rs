//! Content store: whole-file reads and writes under a fixed project root.
//!
//! The store owns no business logic. Writes truncate and rewrite the full
//! target file, creating parent directories as needed; reads are restricted
//! to known text extensions so binary files never reach a prompt.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::types::WriteStats;

/// Extensions the store will read back as text.
const TEXT_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "html", "css", "json", "toml", "txt", "md", "yml", "yaml", "xml",
    "sql", "sh",
];

/// Read/write access to text files under a fixed base path.
#[derive(Debug, Clone)]
pub struct ContentStore {
    base: PathBuf,
}

impl ContentStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Read the whole file at `rel` (relative to the base path).
    pub fn read(&self, rel: &str) -> Result<String> {
        let full = self.base.join(rel);
        if !full.exists() {
            bail!("file not found: {rel}");
        }
        if !full.is_file() {
            bail!("path is not a file: {rel}");
        }
        if !has_text_extension(&full) {
            bail!("file type not supported for reading: {rel}");
        }
        fs::read_to_string(&full).with_context(|| format!("read {}", full.display()))
    }

    /// Truncate-rewrite the whole file at `rel`, creating parent
    /// directories first.
    pub fn write(&self, rel: &str, content: &str) -> Result<WriteStats> {
        let full = self.base.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&full, content).with_context(|| format!("write {}", full.display()))?;
        debug!(path = rel, bytes = content.len(), "file written");
        Ok(WriteStats {
            path: rel.to_string(),
            bytes: content.len(),
            lines: content.lines().count(),
        })
    }
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies write → read round-trips content and reports stats.
    #[test]
    fn write_then_read_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(temp.path());

        let stats = store.write("notes.txt", "one\ntwo\n").expect("write");
        assert_eq!(stats.path, "notes.txt");
        assert_eq!(stats.bytes, 8);
        assert_eq!(stats.lines, 2);

        let content = store.read("notes.txt").expect("read");
        assert_eq!(content, "one\ntwo\n");
    }

    /// Verifies parent directories are created on write.
    #[test]
    fn write_creates_parent_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(temp.path());

        store.write("deep/nested/file.md", "body").expect("write");
        assert!(temp.path().join("deep/nested/file.md").is_file());
    }

    /// Verifies a second write overwrites rather than accumulates.
    #[test]
    fn write_overwrites_existing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(temp.path());

        store.write("a.txt", "first version").expect("write");
        store.write("a.txt", "second").expect("write");
        assert_eq!(store.read("a.txt").expect("read"), "second");
    }

    #[test]
    fn read_missing_file_errors() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(temp.path());
        let err = store.read("nope.txt").unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn read_rejects_unknown_extension() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("blob.bin"), [0u8, 1, 2]).expect("write");
        let store = ContentStore::new(temp.path());
        let err = store.read("blob.bin").unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }
}
