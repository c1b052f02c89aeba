//! Behavioral tests for `DirectorySynchronizer` over real scratch trees.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use sg_sync::DirectorySynchronizer;
use tempfile::TempDir;

struct Trees {
    _temp: TempDir,
    source: Utf8PathBuf,
    destination: Utf8PathBuf,
}

impl Trees {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let source = root.join("www/img");
        let destination = root.join("_site/img");
        fs::create_dir_all(&source).unwrap();
        Self {
            _temp: temp,
            source,
            destination,
        }
    }

    fn write_source(&self, relative: &str, contents: &str) {
        write(&self.source.join(relative), contents);
    }

    fn write_destination(&self, relative: &str, contents: &str) {
        write(&self.destination.join(relative), contents);
    }
}

fn write(path: &Utf8Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn second_sync_is_a_noop() {
    let trees = Trees::new();
    trees.write_source("logo.png", "png");
    trees.write_source("icons/a.svg", "<svg/>");
    trees.write_destination("stale.gif", "gif");

    let synchronizer = DirectorySynchronizer::default();
    let first = synchronizer.sync(&trees.source, &trees.destination).unwrap();
    assert_eq!(first.copied, 2);
    assert_eq!(first.deleted, 1);

    let second = synchronizer.sync(&trees.source, &trees.destination).unwrap();
    assert!(second.is_noop(), "{second}");
    assert_eq!(second.unchanged, 2);
}

#[test]
fn new_files_arrive_with_identical_content() {
    let trees = Trees::new();
    trees.write_source("a.png", "alpha");
    trees.write_source("nested/deeper/b.png", "beta");

    DirectorySynchronizer::default()
        .sync(&trees.source, &trees.destination)
        .unwrap();

    assert_eq!(fs::read_to_string(trees.destination.join("a.png")).unwrap(), "alpha");
    assert_eq!(
        fs::read_to_string(trees.destination.join("nested/deeper/b.png")).unwrap(),
        "beta"
    );
}

#[test]
fn changed_files_are_recopied() {
    let trees = Trees::new();
    trees.write_source("a.png", "one");
    let synchronizer = DirectorySynchronizer::default();
    synchronizer.sync(&trees.source, &trees.destination).unwrap();

    trees.write_source("a.png", "two, longer");
    let report = synchronizer.sync(&trees.source, &trees.destination).unwrap();

    assert_eq!(report.copied, 1);
    assert_eq!(
        fs::read_to_string(trees.destination.join("a.png")).unwrap(),
        "two, longer"
    );
}

#[test]
fn orphans_are_removed_and_emptied_dirs_pruned() {
    let trees = Trees::new();
    trees.write_source("keep.png", "k");
    trees.write_destination("keep.png", "old");
    trees.write_destination("gone/deep/x.png", "x");
    trees.write_destination("gone/y.png", "y");

    let report = DirectorySynchronizer::default()
        .sync(&trees.source, &trees.destination)
        .unwrap();

    assert_eq!(report.deleted, 2);
    assert_eq!(report.directories_removed, 2);
    assert!(!trees.destination.join("gone").exists());
    assert!(trees.destination.exists());
    assert_eq!(fs::read_to_string(trees.destination.join("keep.png")).unwrap(), "k");
}

#[test]
fn directory_replaced_by_file_of_same_name() {
    let trees = Trees::new();
    trees.write_source("thing", "now a file");
    trees.write_destination("thing/inner.png", "was a dir");

    DirectorySynchronizer::default()
        .sync(&trees.source, &trees.destination)
        .unwrap();

    assert_eq!(
        fs::read_to_string(trees.destination.join("thing")).unwrap(),
        "now a file"
    );
}

#[test]
fn missing_source_leaves_destination_untouched() {
    let trees = Trees::new();
    trees.write_destination("keep.png", "k");
    fs::remove_dir_all(&trees.source).unwrap();

    let report = DirectorySynchronizer::default()
        .sync(&trees.source, &trees.destination)
        .unwrap();

    assert!(report.is_noop());
    assert_eq!(fs::read_to_string(trees.destination.join("keep.png")).unwrap(), "k");
}

#[test]
fn source_is_never_modified() {
    let trees = Trees::new();
    trees.write_source("a.png", "a");
    trees.write_destination("b.png", "b");

    DirectorySynchronizer::default()
        .sync(&trees.source, &trees.destination)
        .unwrap();

    let entries: Vec<_> = fs::read_dir(&trees.source)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, ["a.png"]);
}

fn set_readonly(path: &Utf8Path, readonly: bool) {
    let mut permissions = fs::metadata(path).unwrap().permissions();
    permissions.set_readonly(readonly);
    fs::set_permissions(path, permissions).unwrap();
}

#[test]
fn read_only_assets_can_be_replaced() {
    let trees = Trees::new();
    let source = trees.source.join("logo.png");
    trees.write_source("logo.png", "first");
    set_readonly(&source, true);

    let synchronizer = DirectorySynchronizer::default();
    synchronizer.sync(&trees.source, &trees.destination).unwrap();
    let copied = trees.destination.join("logo.png");
    assert!(fs::metadata(&copied).unwrap().permissions().readonly());

    set_readonly(&source, false);
    trees.write_source("logo.png", "second, longer");
    set_readonly(&source, true);

    let report = synchronizer.sync(&trees.source, &trees.destination).unwrap();
    assert_eq!(report.copied, 1);
    assert_eq!(fs::read_to_string(&copied).unwrap(), "second, longer");

    // Leave the tree removable on platforms that refuse to unlink read-only files.
    set_readonly(&source, false);
    set_readonly(&copied, false);
}

#[cfg(unix)]
#[test]
fn destination_symlink_is_replaced_not_followed() {
    let trees = Trees::new();
    let outside = trees.destination.parent().unwrap().join("outside.txt");
    write(&outside, "precious");
    fs::create_dir_all(&trees.destination).unwrap();
    std::os::unix::fs::symlink(&outside, trees.destination.join("a.png")).unwrap();
    std::os::unix::fs::symlink(&outside, trees.destination.join("orphan.png")).unwrap();
    trees.write_source("a.png", "overwritten");

    let synchronizer = DirectorySynchronizer::default();
    let first = synchronizer.sync(&trees.source, &trees.destination).unwrap();

    assert_eq!(first.copied, 1);
    assert_eq!(fs::read_to_string(&outside).unwrap(), "precious");
    let copied = trees.destination.join("a.png");
    assert!(!fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&copied).unwrap(), "overwritten");
    assert!(fs::symlink_metadata(trees.destination.join("orphan.png")).is_err());

    let second = synchronizer.sync(&trees.source, &trees.destination).unwrap();
    assert!(second.is_noop(), "{second}");
}
