//! Operation option models, enums and crate error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::conf::{N_MODE_ZIP_ENTRY_DIR, N_MODE_ZIP_ENTRY_FILE};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Traversal decision returned by [`crate::walk::TreeVisitor::enter_dir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumVisitFlow {
    /// Descend into the directory and visit its children.
    Continue,
    /// Do not descend; `leave_dir` is not invoked for this directory.
    SkipSubtree,
}

/// Compression applied to file entries written by `zip_tree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumZipCompression {
    /// Store bytes as-is.
    Stored,
    /// Deflate-compress bytes.
    Deflated,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `zip_tree_with_options`.
#[derive(Debug, Clone, Copy)]
pub struct SpecZipOptions {
    /// Compression method for file entries.
    pub rule_compression: EnumZipCompression,
    /// Unix permission bits recorded on file entries.
    pub unix_permissions_file: u32,
    /// Unix permission bits recorded on directory entries.
    pub unix_permissions_dir: u32,
}

impl Default for SpecZipOptions {
    fn default() -> Self {
        Self {
            rule_compression: EnumZipCompression::Deflated,
            unix_permissions_file: N_MODE_ZIP_ENTRY_FILE,
            unix_permissions_dir: N_MODE_ZIP_ENTRY_DIR,
        }
    }
}

/// Input options for `write_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecWriteOptions {
    /// Replace the file when it already exists.
    pub if_overwrite: bool,
    /// Create missing parent directories before writing.
    pub if_create_missing_parents: bool,
}

impl Default for SpecWriteOptions {
    fn default() -> Self {
        Self {
            if_overwrite: true,
            if_create_missing_parents: true,
        }
    }
}

/// Errors raised inside one tree operation.
///
/// Public operations never return these; they are folded into the
/// operation report or the diagnostic log.
#[derive(Debug, Error)]
pub enum FsOpError {
    /// Filesystem call failed on `path`.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path the call was made on.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Archive container could not be read or written.
    #[error("Archive error on {}: {source}", .path.display())]
    Zip {
        /// Archive path.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },
    /// Staged archive could not replace the target path.
    #[error("Failed to persist archive {}: {source}", .path.display())]
    Persist {
        /// Archive path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Source and destination resolve to the same file.
    #[error("Source and destination are the same file: {}", .path.display())]
    SameFile {
        /// Source path.
        path: PathBuf,
    },
    /// Entry does not live under the computed root.
    #[error("Path {} is not under root {}", .path.display(), .root.display())]
    StripPrefix {
        /// Entry path.
        path: PathBuf,
        /// Root the entry was expected under.
        root: PathBuf,
    },
}

impl FsOpError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.into(),
            source,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
