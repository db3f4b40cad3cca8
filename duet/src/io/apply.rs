//! Applies parsed file operations against the content store.
//!
//! Each operation kind has distinct read-modify-write semantics. Store
//! failures become per-operation outcomes, so one bad path never aborts the
//! remaining operations of a run.

use tracing::{info, warn};

use crate::core::types::{ExecutionOutcome, FileOperation};
use crate::io::store::ContentStore;

/// Execute one parsed operation, reporting the result as data.
pub fn apply_operation(store: &ContentStore, op: &FileOperation) -> ExecutionOutcome {
    match op {
        FileOperation::Create { path, content } => write_full(store, path, content),
        FileOperation::ModifyAppend { path, content } => {
            // A missing or unreadable target degrades to creating the file
            // from the payload alone.
            let merged = match store.read(path) {
                Ok(existing) => format!("{existing}\n{content}"),
                Err(_) => content.clone(),
            };
            write_full(store, path, &merged)
        }
        FileOperation::ModifyReplace {
            path,
            search,
            replace,
        } => match store.read(path) {
            Ok(existing) => {
                // Literal replacement of every occurrence; zero matches
                // still write back and count as success.
                let updated = existing.replace(search.as_str(), replace);
                write_full(store, path, &updated)
            }
            Err(err) => {
                warn!(path, "replace target unreadable");
                ExecutionOutcome::Failed {
                    message: format!("cannot read file for modification: {path}: {err:#}"),
                }
            }
        },
    }
}

fn write_full(store: &ContentStore, path: &str, content: &str) -> ExecutionOutcome {
    match store.write(path, content) {
        Ok(stats) => {
            info!(path, bytes = stats.bytes, "operation applied");
            ExecutionOutcome::Applied { stats }
        }
        Err(err) => ExecutionOutcome::Failed {
            message: format!("{err:#}"),
        },
    }
}
