//! Depth-first traversal driver and the per-entry callback contract.
//!
//! The driver owns the "how to walk" part: listing, ordering and recursion.
//! Operations implement [`TreeVisitor`] and own the "what to do" part.

use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::spec::EnumVisitFlow;

/// Hooks invoked by [`walk_tree`] once per filesystem entry.
///
/// A hook never aborts the walk; whatever it reports or swallows, the driver
/// moves on to the next sibling.
pub trait TreeVisitor {
    /// Called before the children of `path_dir` are listed, including for the
    /// walk root itself.
    fn enter_dir(&mut self, path_dir: &Path) -> EnumVisitFlow;

    /// Called for every non-directory entry. Symbolic links land here and are
    /// never followed.
    fn visit_file(&mut self, path_file: &Path);

    /// Called after all children of `path_dir` were visited. `error` is set
    /// when listing the directory failed.
    fn leave_dir(&mut self, path_dir: &Path, error: Option<&io::Error>);

    /// Called for an entry whose type could not be determined.
    fn visit_failed(&mut self, path: &Path, error: &io::Error) {
        warn!(path = %path.display(), %error, "Failed to inspect entry");
    }
}

/// Walk `root` depth-first, dispatching every entry to `visitor`.
///
/// A directory's children are visited in file-name order. When `root` is not
/// a directory only [`TreeVisitor::visit_file`] is called, once.
///
/// Returns an error only when `root` itself cannot be inspected (for
/// instance it does not exist). Failures below the root are reported through
/// the visitor hooks.
pub fn walk_tree<P, V>(root: P, visitor: &mut V) -> io::Result<()>
where
    P: AsRef<Path>,
    V: TreeVisitor + ?Sized,
{
    let path_root = root.as_ref();
    let meta_root = fs::symlink_metadata(path_root)?;
    if meta_root.is_dir() {
        walk_directory(path_root, visitor);
    } else {
        visitor.visit_file(path_root);
    }
    Ok(())
}

fn walk_directory<V>(path_dir: &Path, visitor: &mut V)
where
    V: TreeVisitor + ?Sized,
{
    if visitor.enter_dir(path_dir) == EnumVisitFlow::SkipSubtree {
        return;
    }

    let iter_entries = match fs::read_dir(path_dir) {
        Ok(iter) => iter,
        Err(e) => {
            visitor.leave_dir(path_dir, Some(&e));
            return;
        }
    };

    let mut l_entries = Vec::new();
    let mut err_listing: Option<io::Error> = None;
    for entry_res in iter_entries {
        match entry_res {
            Ok(entry) => l_entries.push(entry),
            Err(e) => {
                err_listing = Some(e);
                break;
            }
        }
    }
    l_entries.sort_by_key(|entry| entry.file_name());

    for entry in l_entries {
        let path_entry = entry.path();
        match entry.file_type() {
            Ok(cfg_file_type) if cfg_file_type.is_dir() => walk_directory(&path_entry, visitor),
            Ok(_) => visitor.visit_file(&path_entry),
            Err(e) => visitor.visit_failed(&path_entry, &e),
        }
    }

    visitor.leave_dir(path_dir, err_listing.as_ref());
}
