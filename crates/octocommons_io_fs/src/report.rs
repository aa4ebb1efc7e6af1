//! Tree operation report model and mutable outcome tracker.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of one `delete_tree` / `zip_tree` run.
///
/// Both sequences keep traversal (visit) order. A path appears in at most
/// one of them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportFsOp {
    /// Entries processed successfully.
    pub succeeded: Vec<PathBuf>,
    /// Entries that could not be processed.
    pub failed: Vec<PathBuf>,
    /// Free-text note, set when the operation itself could not complete.
    pub message: Option<String>,
}

impl ReportFsOp {
    /// Number of entries processed successfully.
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of entries that failed.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// `true` when nothing failed and no message was attached.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.message.is_none()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_succeeded".to_string(), self.succeeded_count() as u64);
        dict_counts.insert("cnt_failed".to_string(), self.failed_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        let txt = format!(
            "{prefix} succeeded={} failed={}",
            dict_counts["cnt_succeeded"], dict_counts["cnt_failed"]
        );
        match &self.message {
            Some(message) => format!("{txt} message={message}"),
            None => txt,
        }
    }
}

impl fmt::Display for ReportFsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FS]"))
    }
}

/// Mutable accumulator owned by an operation while it walks a tree.
#[derive(Debug, Default, Clone)]
pub struct ReportFsOpBuilder {
    /// See [`ReportFsOp::succeeded`].
    pub succeeded: Vec<PathBuf>,
    /// See [`ReportFsOp::failed`].
    pub failed: Vec<PathBuf>,
    /// See [`ReportFsOp::message`].
    pub message: Option<String>,
}

impl ReportFsOpBuilder {
    /// Record one successfully processed entry.
    pub fn add_succeeded(&mut self, path: &Path) {
        self.succeeded.push(path.to_path_buf());
    }

    /// Record one entry that could not be processed.
    pub fn add_failed(&mut self, path: &Path) {
        self.failed.push(path.to_path_buf());
    }

    /// Attach an operation-level message. A later call replaces the earlier one.
    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    /// Move every succeeded entry to the end of `failed`, keeping order.
    ///
    /// Used when a late step invalidates work already recorded.
    pub fn demote_succeeded(&mut self) {
        let l_succeeded = std::mem::take(&mut self.succeeded);
        self.failed.extend(l_succeeded);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportFsOp {
        ReportFsOp {
            succeeded: self.succeeded,
            failed: self.failed,
            message: self.message,
        }
    }
}
