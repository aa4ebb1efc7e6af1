//! Archive namespace constants and default presets.

/// Separator used between components of an archive entry name.
pub const C_ZIP_NAME_SEPARATOR: &str = "/";
/// Permission bits recorded on archived file entries.
pub const N_MODE_ZIP_ENTRY_FILE: u32 = 0o644;
/// Permission bits recorded on archived directory entries.
pub const N_MODE_ZIP_ENTRY_DIR: u32 = 0o755;
/// Permission bits applied to a newly created archive file.
pub const N_MODE_ARCHIVE_NEW: u32 = 0o644;
/// Prefix of the staging file an archive is written to before it is persisted.
pub const C_ZIP_STAGING_PREFIX: &str = ".octocommons-zip-";
/// Suffix of the staging file.
pub const C_ZIP_STAGING_SUFFIX: &str = ".tmp";
/// Bytes of a source file buffered in memory before spilling to disk.
pub const N_ZIP_SPOOL_BYTES: usize = 8 * 1024 * 1024;
/// Entry size from which the zip64 extension is required.
pub const N_ZIP64_THRESHOLD_BYTES: u64 = u32::MAX as u64;
