//! Zip archive operation and the scoped archive handle.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::conf::{
    C_ZIP_STAGING_PREFIX, C_ZIP_STAGING_SUFFIX, N_ZIP_SPOOL_BYTES, N_ZIP64_THRESHOLD_BYTES,
};
use crate::report::{ReportFsOp, ReportFsOpBuilder};
use crate::spec::{EnumVisitFlow, EnumZipCompression, FsOpError, SpecZipOptions};
use crate::util::{
    absolutize_path, derive_relative_path, derive_relative_root, derive_zip_entry_name,
    derive_zip_parent_dirs,
};
use crate::walk::{TreeVisitor, walk_tree};

/// Archive `source_path` into the zip file at `archive_path` with default
/// [`SpecZipOptions`].
///
/// See [`zip_tree_with_options`].
pub fn zip_tree<P, Q>(archive_path: P, source_path: Q) -> ReportFsOp
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    zip_tree_with_options(archive_path, source_path, SpecZipOptions::default())
}

/// Archive `source_path` (file or directory) into the zip file at
/// `archive_path`.
///
/// Entry names are relative to the source directory, or to the parent of a
/// single source file. Parent directory entries are written before the
/// first file that needs them. An existing archive is merged into: its
/// entries are kept unless a new entry of the same name replaces them.
///
/// The archive is assembled in a staging file next to `archive_path` and
/// only replaces the target once fully written, so the target is never left
/// half-written. Failures never propagate:
/// - the archive cannot be opened: empty report with a message;
/// - a source file cannot be read: it is recorded as failed;
/// - the archive cannot be finalized: every entry is recorded as failed and a
///   message is attached.
pub fn zip_tree_with_options<P, Q>(
    archive_path: P,
    source_path: Q,
    spec_zip_options: SpecZipOptions,
) -> ReportFsOp
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_zip = archive_path.as_ref();
    let path_src = source_path.as_ref();
    let mut builder_zip_report = ReportFsOpBuilder::default();

    let handle_zip = match ArchiveHandle::open(path_zip, spec_zip_options) {
        Ok(v) => v,
        Err(e) => {
            debug!(archive = %path_zip.display(), error = %e, "Unable to open archive");
            builder_zip_report.set_message(e.to_string());
            return builder_zip_report.build();
        }
    };

    let mut zip_visitor = ZipVisitor {
        handle_zip,
        path_dir_root: derive_relative_root(path_src),
        builder_zip_report,
    };
    match walk_tree(path_src, &mut zip_visitor) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(source = %path_src.display(), "Nothing to archive");
        }
        Err(e) => {
            debug!(source = %path_src.display(), error = %e, "Unable to walk source");
            zip_visitor
                .builder_zip_report
                .set_message(FsOpError::io(path_src, e).to_string());
        }
    }

    let ZipVisitor {
        handle_zip,
        mut builder_zip_report,
        ..
    } = zip_visitor;
    match handle_zip.close() {
        Ok(()) => debug!(
            source = %path_src.display(),
            archive = %path_zip.display(),
            "File/folder is zipped"
        ),
        Err(e) => {
            debug!(archive = %path_zip.display(), error = %e, "Unable to finalize archive");
            builder_zip_report.demote_succeeded();
            builder_zip_report.set_message(e.to_string());
        }
    }

    let report_zip = builder_zip_report.build();
    debug!(archive = %path_zip.display(), "{}", report_zip.format("[ZIP]"));
    report_zip
}

////////////////////////////////////////////////////////////////////////////////
// #region ArchiveHandle

/// Exclusively owned, open archive container.
///
/// Entries are written into a staging file. [`ArchiveHandle::close`] is the
/// only way to publish them; dropping the handle on any other path discards
/// the staging file and leaves the target untouched.
pub(crate) struct ArchiveHandle {
    path_zip: PathBuf,
    path_zip_abs: PathBuf,
    path_staging_abs: PathBuf,
    writer: ZipWriter<NamedTempFile>,
    archive_prev: Option<ZipArchive<File>>,
    permissions_prev: Option<fs::Permissions>,
    set_names_written: HashSet<String>,
    options_file: FileOptions,
    options_dir: FileOptions,
    /// Set once an entry was started but its bytes could not be written.
    if_entry_incomplete: bool,
}

impl ArchiveHandle {
    /// Open the archive at `path_zip`, creating it when absent.
    ///
    /// An existing empty file counts as a new archive.
    pub(crate) fn open(
        path_zip: &Path,
        spec_zip_options: SpecZipOptions,
    ) -> Result<Self, FsOpError> {
        let (archive_prev, permissions_prev) = match fs::metadata(path_zip) {
            Ok(meta_zip) if meta_zip.is_file() && meta_zip.len() == 0 => {
                (None, Some(meta_zip.permissions()))
            }
            Ok(meta_zip) => {
                let file_zip = File::open(path_zip).map_err(|e| FsOpError::io(path_zip, e))?;
                let archive =
                    ZipArchive::new(file_zip).map_err(|e| FsOpError::zip(path_zip, e))?;
                (Some(archive), Some(meta_zip.permissions()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (None, None),
            Err(e) => return Err(FsOpError::io(path_zip, e)),
        };

        let path_dir_parent = match path_zip.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_staging = tempfile::Builder::new()
            .prefix(C_ZIP_STAGING_PREFIX)
            .suffix(C_ZIP_STAGING_SUFFIX)
            .tempfile_in(&path_dir_parent)
            .map_err(|e| FsOpError::io(&path_dir_parent, e))?;
        let path_staging_abs = absolutize_path(file_staging.path());

        let method_compression = match spec_zip_options.rule_compression {
            EnumZipCompression::Stored => CompressionMethod::Stored,
            EnumZipCompression::Deflated => CompressionMethod::Deflated,
        };
        let options_file = FileOptions::default()
            .compression_method(method_compression)
            .unix_permissions(spec_zip_options.unix_permissions_file);
        let options_dir = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(spec_zip_options.unix_permissions_dir);

        Ok(Self {
            path_zip: path_zip.to_path_buf(),
            path_zip_abs: absolutize_path(path_zip),
            path_staging_abs,
            writer: ZipWriter::new(file_staging),
            archive_prev,
            permissions_prev,
            set_names_written: HashSet::new(),
            options_file,
            options_dir,
            if_entry_incomplete: false,
        })
    }

    /// `true` when `path` is the archive itself or its staging file.
    pub(crate) fn is_own_file(&self, path: &Path) -> bool {
        let path_abs = absolutize_path(path);
        path_abs == self.path_zip_abs || path_abs == self.path_staging_abs
    }

    /// Write the bytes of `path_file` as entry `name_entry`, adding any
    /// missing parent directory entries first.
    ///
    /// The source is drained into a spooled buffer (memory first, disk past
    /// [`N_ZIP_SPOOL_BYTES`]) before the entry starts, so an unreadable file
    /// leaves no trace in the archive. Entries of 4 GiB or more are written
    /// as zip64.
    pub(crate) fn write_file(
        &mut self,
        path_file: &Path,
        name_entry: &str,
    ) -> Result<(), FsOpError> {
        let mut file_src = File::open(path_file).map_err(|e| FsOpError::io(path_file, e))?;
        let mut file_spool = tempfile::spooled_tempfile(N_ZIP_SPOOL_BYTES);
        let n_bytes = io::copy(&mut file_src, &mut file_spool)
            .and_then(|n_bytes| file_spool.seek(SeekFrom::Start(0)).map(|_| n_bytes))
            .map_err(|e| FsOpError::io(path_file, e))?;

        for name_dir in derive_zip_parent_dirs(name_entry) {
            if self.set_names_written.contains(&name_dir) {
                continue;
            }
            self.writer
                .add_directory(name_dir.as_str(), self.options_dir)
                .map_err(|e| FsOpError::zip(&self.path_zip, e))?;
            self.set_names_written.insert(name_dir);
        }

        let options_entry = self.options_file.large_file(n_bytes >= N_ZIP64_THRESHOLD_BYTES);
        self.writer
            .start_file(name_entry, options_entry)
            .map_err(|e| FsOpError::zip(&self.path_zip, e))?;
        if let Err(e) = io::copy(&mut file_spool, &mut self.writer) {
            self.if_entry_incomplete = true;
            return Err(FsOpError::io(&self.path_zip, e));
        }
        self.set_names_written.insert(name_entry.to_string());
        Ok(())
    }

    /// Carry over surviving entries of the previous archive, finalize, and
    /// atomically replace the target path.
    pub(crate) fn close(self) -> Result<(), FsOpError> {
        let Self {
            path_zip,
            mut writer,
            archive_prev,
            permissions_prev,
            set_names_written,
            if_entry_incomplete,
            ..
        } = self;

        if if_entry_incomplete {
            return Err(FsOpError::io(
                &path_zip,
                io::Error::other("an archive entry was left incomplete"),
            ));
        }

        if let Some(mut archive_prev) = archive_prev {
            for n_idx in 0..archive_prev.len() {
                let file_prev = archive_prev
                    .by_index_raw(n_idx)
                    .map_err(|e| FsOpError::zip(&path_zip, e))?;
                if set_names_written.contains(file_prev.name()) {
                    continue;
                }
                writer
                    .raw_copy_file(file_prev)
                    .map_err(|e| FsOpError::zip(&path_zip, e))?;
            }
        }

        let file_staging = writer.finish().map_err(|e| FsOpError::zip(&path_zip, e))?;
        if let Err(e) = apply_archive_permissions(file_staging.path(), permissions_prev) {
            debug!(archive = %path_zip.display(), error = %e, "Unable to set archive permissions");
        }
        file_staging
            .persist(&path_zip)
            .map_err(|e| FsOpError::Persist {
                path: path_zip.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

fn apply_archive_permissions(
    path_staging: &Path,
    permissions_prev: Option<fs::Permissions>,
) -> io::Result<()> {
    match permissions_prev {
        Some(permissions) => fs::set_permissions(path_staging, permissions),
        None => apply_new_archive_permissions(path_staging),
    }
}

#[cfg(unix)]
fn apply_new_archive_permissions(path_staging: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    use crate::conf::N_MODE_ARCHIVE_NEW;

    fs::set_permissions(path_staging, fs::Permissions::from_mode(N_MODE_ARCHIVE_NEW))
}

#[cfg(not(unix))]
fn apply_new_archive_permissions(_path_staging: &Path) -> io::Result<()> {
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Visitor

struct ZipVisitor {
    handle_zip: ArchiveHandle,
    path_dir_root: PathBuf,
    builder_zip_report: ReportFsOpBuilder,
}

impl ZipVisitor {
    fn archive_file(&mut self, path_file: &Path) -> Result<(), FsOpError> {
        let path_rel = derive_relative_path(path_file, &self.path_dir_root)?;
        let name_entry =
            derive_zip_entry_name(&path_rel).ok_or_else(|| FsOpError::StripPrefix {
                path: path_file.to_path_buf(),
                root: self.path_dir_root.clone(),
            })?;
        self.handle_zip.write_file(path_file, &name_entry)
    }
}

impl TreeVisitor for ZipVisitor {
    fn enter_dir(&mut self, _path_dir: &Path) -> EnumVisitFlow {
        EnumVisitFlow::Continue
    }

    fn visit_file(&mut self, path_file: &Path) {
        if self.handle_zip.is_own_file(path_file) {
            debug!(path = %path_file.display(), "Archive is inside its source, skipped");
            return;
        }
        match self.archive_file(path_file) {
            Ok(()) => self.builder_zip_report.add_succeeded(path_file),
            Err(e) => {
                self.builder_zip_report.add_failed(path_file);
                debug!(path = %path_file.display(), error = %e, "Unable to zip file");
            }
        }
    }

    fn leave_dir(&mut self, path_dir: &Path, error: Option<&io::Error>) {
        if let Some(e) = error {
            debug!(path = %path_dir.display(), error = %e, "Unable to list directory");
        }
    }

    fn visit_failed(&mut self, path: &Path, error: &io::Error) {
        self.builder_zip_report.add_failed(path);
        debug!(path = %path.display(), %error, "Unable to inspect entry");
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
