//! Best-effort tree copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::spec::{EnumVisitFlow, FsOpError};
use crate::util::{copy_file_with_metadata, derive_destination_path, is_overlap, is_same_file};
use crate::walk::{TreeVisitor, walk_tree};

/// Copy `source_path` (file or directory) into the directory `target_path`.
///
/// A directory source has its whole relative structure recreated under
/// `target_path`; the source directory itself is not. A single file source
/// is placed directly under `target_path` with its own name. Missing
/// directories are created, existing files are overwritten, and on Linux
/// permissions, timestamps and extended attributes are carried over.
///
/// Copying is best-effort: an entry that cannot be copied is logged and
/// skipped, and nothing is reported back to the caller. A directory source
/// whose target is itself or lies inside it is refused before anything is
/// written, and a file that would be copied onto itself is skipped.
pub fn copy_tree<P, Q>(source_path: P, target_path: Q)
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = source_path.as_ref();
    let path_dir_dst = target_path.as_ref();

    if path_src.is_dir() && is_overlap(path_src, path_dir_dst) {
        warn!(
            source = %path_src.display(),
            target = %path_dir_dst.display(),
            "Target overlaps source, nothing is copied"
        );
        return;
    }

    let mut cp_visitor = CopyVisitor {
        path_dir_src: None,
        path_dir_dst: path_dir_dst.to_path_buf(),
        cnt_copied: 0,
        cnt_skipped: 0,
    };
    if let Err(e) = walk_tree(path_src, &mut cp_visitor) {
        warn!(source = %path_src.display(), error = %e, "Unable to copy source");
        return;
    }
    debug!(
        source = %path_src.display(),
        target = %path_dir_dst.display(),
        cnt_copied = cp_visitor.cnt_copied,
        cnt_skipped = cp_visitor.cnt_skipped,
        "[COPY] finished"
    );
}

#[derive(Debug)]
struct CopyVisitor {
    /// Set by the first visited node; `None` until then.
    path_dir_src: Option<PathBuf>,
    path_dir_dst: PathBuf,
    cnt_copied: u64,
    cnt_skipped: u64,
}

impl CopyVisitor {
    fn copy_file(&mut self, path_file_src: &Path) -> Result<PathBuf, FsOpError> {
        let path_dir_src = self.path_dir_src.get_or_insert_with(|| {
            path_file_src
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        });
        let path_file_dst =
            derive_destination_path(path_file_src, path_dir_src, &self.path_dir_dst)?;
        if is_same_file(path_file_src, &path_file_dst) {
            return Err(FsOpError::SameFile {
                path: path_file_src.to_path_buf(),
            });
        }

        if let Some(path_parent_dst) = path_file_dst.parent()
            && !path_parent_dst.exists()
        {
            debug!(
                path = %path_file_dst.display(),
                "Destination parent does not exist, creating it"
            );
            fs::create_dir_all(path_parent_dst).map_err(|e| FsOpError::io(path_parent_dst, e))?;
        }

        copy_file_with_metadata(path_file_src, &path_file_dst)
            .map_err(|e| FsOpError::io(path_file_src, e))?;
        Ok(path_file_dst)
    }
}

impl TreeVisitor for CopyVisitor {
    fn enter_dir(&mut self, path_dir: &Path) -> EnumVisitFlow {
        let Some(path_dir_src) = &self.path_dir_src else {
            self.path_dir_src = Some(path_dir.to_path_buf());
            if let Err(e) = fs::create_dir_all(&self.path_dir_dst) {
                warn!(
                    path = %self.path_dir_dst.display(),
                    error = %e,
                    "Unable to create target directory"
                );
                return EnumVisitFlow::SkipSubtree;
            }
            return EnumVisitFlow::Continue;
        };

        let res_dir_dst = derive_destination_path(path_dir, path_dir_src, &self.path_dir_dst)
            .and_then(|path_dir_dst| {
                fs::create_dir_all(&path_dir_dst).map_err(|e| FsOpError::io(path_dir_dst, e))
            });
        match res_dir_dst {
            Ok(()) => EnumVisitFlow::Continue,
            Err(e) => {
                self.cnt_skipped += 1;
                warn!(path = %path_dir.display(), error = %e, "Unable to copy directory");
                EnumVisitFlow::SkipSubtree
            }
        }
    }

    fn visit_file(&mut self, path_file: &Path) {
        match self.copy_file(path_file) {
            Ok(path_file_dst) => {
                self.cnt_copied += 1;
                info!(
                    source = %path_file.display(),
                    target = %path_file_dst.display(),
                    "File is copied"
                );
            }
            Err(e) => {
                self.cnt_skipped += 1;
                debug!(path = %path_file.display(), error = %e, "Unable to copy file");
            }
        }
    }

    fn leave_dir(&mut self, path_dir: &Path, error: Option<&io::Error>) {
        if let Some(e) = error {
            self.cnt_skipped += 1;
            debug!(path = %path_dir.display(), error = %e, "Unable to list directory");
        }
    }
}
