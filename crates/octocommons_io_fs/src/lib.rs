//! `octocommons_io_fs` v1:
//! Rust-side filesystem tree operation engine.
//!
//! Every operation walks a tree once, handles entries one by one and never
//! lets a single failing entry stop the rest:
//! - `walk`    : depth-first driver and the [`TreeVisitor`] callback contract
//! - `delete`  : bottom-up removal with a per-file report
//! - `archive` : zip archiving with a per-file report
//! - `copy`    : best-effort replication, diagnostics via `tracing` only
//! - `write`   : single-file byte write primitive
//! - `report`  : operation report model and its builder
//! - `spec`    : enums/options/errors
//! - `conf`    : constants
//! - `util`    : shared helper functions
//!
//! Operations are synchronous and single-threaded; callers serialize
//! concurrent calls on overlapping paths.

pub mod archive;
pub mod conf;
pub mod copy;
pub mod delete;
pub mod report;
pub mod spec;
pub mod walk;
pub mod write;
mod util;

#[cfg(test)]
mod testing;

pub use archive::{zip_tree, zip_tree_with_options};
pub use copy::copy_tree;
pub use delete::delete_tree;
pub use report::{ReportFsOp, ReportFsOpBuilder};
pub use spec::{EnumVisitFlow, EnumZipCompression, FsOpError, SpecWriteOptions, SpecZipOptions};
pub use walk::{TreeVisitor, walk_tree};
pub use write::write_file;
