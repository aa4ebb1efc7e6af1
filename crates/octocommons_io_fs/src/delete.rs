//! Best-effort recursive removal.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::report::{ReportFsOp, ReportFsOpBuilder};
use crate::spec::EnumVisitFlow;
use crate::walk::{TreeVisitor, walk_tree};

/// Remove the file or directory tree at `path`, bottom-up.
///
/// Files are removed as they are visited and recorded in
/// [`ReportFsOp::succeeded`] or [`ReportFsOp::failed`]. A directory is
/// removed once all of its children were visited; directories are not
/// tracked in the report, and one that is still non-empty simply stays.
///
/// Never fails: a missing `path` yields an empty report, and an unlistable
/// directory only abandons its own subtree.
pub fn delete_tree<P>(path: P) -> ReportFsOp
where
    P: AsRef<Path>,
{
    let path_root = path.as_ref();
    let mut del_visitor = DeleteVisitor::default();

    match walk_tree(path_root, &mut del_visitor) {
        Ok(()) => debug!(path = %path_root.display(), "File/folder is deleted"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path_root.display(), "Nothing to delete")
        }
        Err(e) => debug!(path = %path_root.display(), error = %e, "Unable to walk path"),
    }

    let report_del = del_visitor.builder_del_report.build();
    debug!(path = %path_root.display(), "{}", report_del.format("[DELETE]"));
    report_del
}

#[derive(Debug, Default)]
struct DeleteVisitor {
    builder_del_report: ReportFsOpBuilder,
}

impl TreeVisitor for DeleteVisitor {
    fn enter_dir(&mut self, _path_dir: &Path) -> EnumVisitFlow {
        EnumVisitFlow::Continue
    }

    fn visit_file(&mut self, path_file: &Path) {
        match fs::remove_file(path_file) {
            Ok(()) => self.builder_del_report.add_succeeded(path_file),
            Err(e) => {
                self.builder_del_report.add_failed(path_file);
                debug!(path = %path_file.display(), error = %e, "Unable to delete file");
            }
        }
    }

    fn leave_dir(&mut self, path_dir: &Path, error: Option<&io::Error>) {
        if let Some(e) = error {
            debug!(path = %path_dir.display(), error = %e, "Unable to list directory");
            return;
        }
        if let Err(e) = fs::remove_dir(path_dir) {
            debug!(path = %path_dir.display(), error = %e, "Unable to delete directory");
        }
    }

    fn visit_failed(&mut self, path: &Path, error: &io::Error) {
        self.builder_del_report.add_failed(path);
        debug!(path = %path.display(), %error, "Unable to inspect entry");
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{DeleteVisitor, delete_tree};
    use crate::spec::EnumVisitFlow;
    use crate::testing::write_text;
    use crate::walk::TreeVisitor;

    #[test]
    fn delete_tree_single_file() {
        let tmp = TempDir::new().expect("tempdir");
        let file = tmp.path().join("file.txt");
        write_text(&file, "x");

        let report = delete_tree(&file);
        assert_eq!(report.succeeded, vec![file.clone()]);
        assert!(report.failed.is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn delete_tree_directory_reports_files_in_visit_order() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        write_text(&root.join("b.txt"), "b");
        write_text(&root.join("a/one.txt"), "1");
        write_text(&root.join("a/sub/two.txt"), "2");

        let report = delete_tree(&root);
        assert!(report.is_clean());
        assert_eq!(
            report.succeeded,
            vec![
                root.join("a/one.txt"),
                root.join("a/sub/two.txt"),
                root.join("b.txt"),
            ]
        );
        assert!(!root.exists());
        assert!(tmp.path().exists());
    }

    #[test]
    fn delete_tree_empty_directory_is_removed_untracked() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("empty");
        std::fs::create_dir_all(root.join("nested")).expect("mkdir");

        let report = delete_tree(&root);
        assert!(report.succeeded.is_empty());
        assert!(report.failed.is_empty());
        assert!(!root.exists());
    }

    #[test]
    fn delete_visitor_counts_vanished_file_as_failed() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        write_text(&root.join("a.txt"), "a");
        write_text(&root.join("gone.txt"), "gone");

        let mut del_visitor = DeleteVisitor::default();
        assert_eq!(del_visitor.enter_dir(&root), EnumVisitFlow::Continue);
        del_visitor.visit_file(&root.join("a.txt"));
        std::fs::remove_file(root.join("gone.txt")).expect("remove behind the walk");
        del_visitor.visit_file(&root.join("gone.txt"));
        del_visitor.leave_dir(&root, None);

        let report = del_visitor.builder_del_report.build();
        assert_eq!(report.succeeded, vec![root.join("a.txt")]);
        assert_eq!(report.failed, vec![root.join("gone.txt")]);
        assert!(!root.exists());
    }

    #[test]
    fn delete_visitor_keeps_directory_with_unremovable_entry() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        write_text(&root.join("a.txt"), "a");
        write_text(&root.join("swapped/inner.txt"), "inner");

        // An entry that turned into a directory after listing cannot be
        // removed as a file, whatever the caller's privileges.
        let mut del_visitor = DeleteVisitor::default();
        del_visitor.enter_dir(&root);
        del_visitor.visit_file(&root.join("a.txt"));
        del_visitor.visit_file(&root.join("swapped"));
        del_visitor.leave_dir(&root, None);

        let report = del_visitor.builder_del_report.build();
        assert_eq!(report.succeeded, vec![root.join("a.txt")]);
        assert_eq!(report.failed, vec![root.join("swapped")]);
        assert!(root.is_dir());
        assert!(root.join("swapped/inner.txt").exists());
    }

    #[test]
    fn delete_tree_missing_path_is_noop() {
        let tmp = TempDir::new().expect("tempdir");
        let report = delete_tree(tmp.path().join("missing"));
        assert!(report.succeeded.is_empty());
        assert!(report.failed.is_empty());
        assert!(report.message.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn delete_tree_isolates_unremovable_file() {
        use crate::testing::{is_permission_enforced, set_mode};

        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        let locked = root.join("locked");
        write_text(&root.join("a.txt"), "a");
        write_text(&locked.join("pinned.txt"), "p");
        write_text(&root.join("z.txt"), "z");

        set_mode(&locked, 0o555);
        if !is_permission_enforced(&locked) {
            set_mode(&locked, 0o755);
            return;
        }

        let report = delete_tree(&root);
        set_mode(&locked, 0o755);

        assert_eq!(report.succeeded, vec![root.join("a.txt"), root.join("z.txt")]);
        assert_eq!(report.failed, vec![locked.join("pinned.txt")]);
        assert!(locked.join("pinned.txt").exists());
        assert!(root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn delete_tree_unlistable_directory_keeps_siblings_reported() {
        use crate::testing::{is_permission_enforced, set_mode};

        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        let sealed = root.join("sealed");
        write_text(&sealed.join("inner.txt"), "i");
        write_text(&root.join("ok.txt"), "ok");

        set_mode(&sealed, 0o000);
        if !is_permission_enforced(&sealed) {
            set_mode(&sealed, 0o755);
            return;
        }

        let report = delete_tree(&root);
        set_mode(&sealed, 0o755);

        assert_eq!(report.succeeded, vec![root.join("ok.txt")]);
        assert!(report.failed.is_empty());
        assert!(sealed.join("inner.txt").exists());
        assert!(!root.join("ok.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn delete_tree_removes_symlink_not_target() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        let outside = tmp.path().join("outside");
        write_text(&outside.join("keep.txt"), "keep");
        std::fs::create_dir_all(&root).expect("mkdir root");
        symlink(&outside, root.join("link")).expect("symlink");

        let report = delete_tree(&root);
        assert_eq!(report.succeeded, vec![root.join("link")]);
        assert!(!root.exists());
        assert!(outside.join("keep.txt").exists());
    }
}
