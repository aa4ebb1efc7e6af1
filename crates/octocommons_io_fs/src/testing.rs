//! Shared helpers for unit tests.

use std::fs;
use std::path::Path;

pub(crate) fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, txt).expect("write text");
}

pub(crate) fn read_text(path: &Path) -> String {
    fs::read_to_string(path).expect("read text")
}

#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("set permissions");
}

/// `false` when the current user can still write into a write-protected
/// `path_dir` (e.g. tests running as root), so permission tests can bail out.
#[cfg(unix)]
pub(crate) fn is_permission_enforced(path_dir: &Path) -> bool {
    let path_probe = path_dir.join(".permission_probe");
    match fs::File::create(&path_probe) {
        Ok(_) => {
            let _ = fs::remove_file(&path_probe);
            false
        }
        Err(_) => true,
    }
}
