use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::conf::C_ZIP_NAME_SEPARATOR;
use crate::spec::FsOpError;

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

pub(crate) fn absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Absolute path with symbolic links resolved as far as the path exists.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged, so targets that are about to be created still compare
/// correctly against their would-be parents.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let path_abs = absolutize_path(path);
    let mut l_tail = Vec::new();
    let mut path_cursor = path_abs.as_path();
    loop {
        if let Ok(path_resolved) = fs::canonicalize(path_cursor) {
            return l_tail
                .iter()
                .rev()
                .fold(path_resolved, |path_acc, part| path_acc.join(part));
        }
        match (path_cursor.parent(), path_cursor.file_name()) {
            (Some(path_parent), Some(part)) => {
                l_tail.push(part.to_os_string());
                path_cursor = path_parent;
            }
            _ => return path_abs,
        }
    }
}

/// `true` when `path_dir_dst` is `path_dir_src` or lies inside it.
pub(crate) fn is_overlap(path_dir_src: &Path, path_dir_dst: &Path) -> bool {
    normalize_path(path_dir_dst).starts_with(normalize_path(path_dir_src))
}

/// `true` when both paths resolve to the same existing file.
pub(crate) fn is_same_file(path_a: &Path, path_b: &Path) -> bool {
    match (fs::canonicalize(path_a), fs::canonicalize(path_b)) {
        (Ok(path_a_resolved), Ok(path_b_resolved)) => path_a_resolved == path_b_resolved,
        _ => false,
    }
}

/// Directory that entry paths are made relative to.
///
/// A directory source is its own root. Anything else (a file, a symbolic
/// link, a missing path) is rooted at its parent so it lands at the top
/// level of the destination.
pub(crate) fn derive_relative_root(path_source: &Path) -> PathBuf {
    let b_is_dir = fs::symlink_metadata(path_source)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if b_is_dir {
        return path_source.to_path_buf();
    }
    path_source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

pub(crate) fn derive_relative_path(
    path_entry: &Path,
    path_root: &Path,
) -> Result<PathBuf, FsOpError> {
    path_entry
        .strip_prefix(path_root)
        .map(Path::to_path_buf)
        .map_err(|_| FsOpError::StripPrefix {
            path: path_entry.to_path_buf(),
            root: path_root.to_path_buf(),
        })
}

/// Map `path_src` (under `path_dir_src`) to the same relative location under
/// `path_dir_dst`.
///
/// # Examples
/// ```ignore
/// use std::path::Path;
/// let path_dst = derive_destination_path(
///     Path::new("/source/dir/sub/file.txt"),
///     Path::new("/source/dir"),
///     Path::new("/destination"),
/// )?;
/// assert_eq!(path_dst, Path::new("/destination/sub/file.txt"));
/// ```
pub(crate) fn derive_destination_path(
    path_src: &Path,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> Result<PathBuf, FsOpError> {
    Ok(path_dir_dst.join(derive_relative_path(path_src, path_dir_src)?))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ArchiveNames

/// Archive entry name for a relative path: normal components joined by `/`.
///
/// Returns `None` when nothing nameable is left (empty path, `..`, roots).
pub(crate) fn derive_zip_entry_name(path_rel: &Path) -> Option<String> {
    let mut l_parts = Vec::new();
    for component in path_rel.components() {
        match component {
            Component::Normal(part) => l_parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if l_parts.is_empty() {
        return None;
    }
    Some(l_parts.join(C_ZIP_NAME_SEPARATOR))
}

/// Directory entry names enclosing `name_entry`, outermost first.
///
/// `"a/b/c.txt"` yields `["a/", "a/b/"]`.
pub(crate) fn derive_zip_parent_dirs(name_entry: &str) -> Vec<String> {
    let mut l_dirs = Vec::new();
    for (n_idx, sep) in name_entry.match_indices(C_ZIP_NAME_SEPARATOR) {
        l_dirs.push(name_entry[..n_idx + sep.len()].to_string());
    }
    l_dirs
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileCopy

/// Copy bytes, then carry over metadata where the platform allows it.
///
/// Only the byte copy can fail the call; metadata is best-effort.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        if let Err(e) = apply_metadata_linux(path_file_src, path_file_dst) {
            tracing::debug!(
                src = %path_file_src.display(),
                dst = %path_file_dst.display(),
                error = %e,
                "Unable to carry over file metadata"
            );
        }
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
