//! Single-file byte write primitive.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::spec::{FsOpError, SpecWriteOptions};

/// Write `content` to `path`, truncating any previous content.
///
/// Returns `false` without touching the file when it exists and
/// `if_overwrite` is off, or when any filesystem call fails. With
/// `if_create_missing_parents` off, a missing parent directory is a failure.
pub fn write_file<P>(path: P, content: &[u8], spec_write_options: SpecWriteOptions) -> bool
where
    P: AsRef<Path>,
{
    let path_file = path.as_ref();
    if !spec_write_options.if_overwrite && path_file.exists() {
        debug!(
            path = %path_file.display(),
            "File already exists and overwrite is not allowed"
        );
        return false;
    }

    match write_bytes(path_file, content, spec_write_options.if_create_missing_parents) {
        Ok(()) => {
            debug!(path = %path_file.display(), "File is written");
            true
        }
        Err(e) => {
            debug!(path = %path_file.display(), error = %e, "Content cannot be written");
            false
        }
    }
}

fn write_bytes(
    path_file: &Path,
    content: &[u8],
    if_create_missing_parents: bool,
) -> Result<(), FsOpError> {
    if if_create_missing_parents
        && let Some(path_parent) = path_file.parent()
        && !path_parent.as_os_str().is_empty()
    {
        fs::create_dir_all(path_parent).map_err(|e| FsOpError::io(path_parent, e))?;
    }
    fs::write(path_file, content).map_err(|e| FsOpError::io(path_file, e))
}
