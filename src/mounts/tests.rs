//! Unit tests for bind-mount set resolution.

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::error::{ContainerBuildError, FilesystemError};

use super::resolve_mounts;

/// Fixture providing the container working directory used by every scenario.
#[fixture]
fn work_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("/home/build/src")
}

/// Create a temporary directory and return it with its canonical UTF-8 path.
fn scratch_dir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = Utf8PathBuf::try_from(dir.path().canonicalize().expect("canonicalize temp dir"))
        .expect("temp dir path is UTF-8");
    (dir, path)
}

#[rstest]
fn maps_directory_to_its_basename_under_work_dir(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let project = root.join("project");
    std::fs::create_dir(&project).expect("create project dir");

    let mounts = resolve_mounts(&[project.clone()], &work_dir, true).expect("resolve");

    assert_eq!(mounts.get(&project), Some(&work_dir.join("project")));
    assert_eq!(mounts.len(), 1);
}

#[rstest]
fn missing_source_aborts_resolution(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let missing = root.join("does-not-exist");

    let error = resolve_mounts(&[missing.clone()], &work_dir, true).expect_err("must fail");

    match error {
        ContainerBuildError::Filesystem(FilesystemError::NotFound { path }) => {
            assert_eq!(path, missing);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[rstest]
fn target_names_come_from_the_supplied_path(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let real = root.join("real");
    std::fs::create_dir(&real).expect("create dir");

    // A path supplied with a trailing dot component still names its directory.
    let supplied = real.join(".");
    let mounts = resolve_mounts(&[supplied], &work_dir, false).expect("resolve");

    assert_eq!(mounts.get(&real), Some(&work_dir.join("real")));
}

#[rstest]
#[cfg_attr(not(unix), ignore = "symlink creation requires unix")]
fn symlinked_subdirectory_is_mounted_alongside_its_parent(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let project = root.join("project");
    let elsewhere = root.join("elsewhere");
    std::fs::create_dir(&project).expect("create project");
    std::fs::create_dir(&elsewhere).expect("create elsewhere");
    #[cfg(unix)]
    std::os::unix::fs::symlink(&elsewhere, project.join("vendor")).expect("create symlink");

    let mounts = resolve_mounts(&[project.clone()], &work_dir, true).expect("resolve");

    assert_eq!(mounts.get(&project), Some(&work_dir.join("project")));
    assert_eq!(
        mounts.get(&elsewhere),
        Some(&work_dir.join("project").join("vendor"))
    );
    assert_eq!(mounts.len(), 2);
}

#[rstest]
#[cfg_attr(not(unix), ignore = "symlink creation requires unix")]
fn expansion_disabled_never_adds_entries(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let project = root.join("project");
    let elsewhere = root.join("elsewhere");
    std::fs::create_dir(&project).expect("create project");
    std::fs::create_dir(&elsewhere).expect("create elsewhere");
    #[cfg(unix)]
    std::os::unix::fs::symlink(&elsewhere, project.join("vendor")).expect("create symlink");

    let mounts = resolve_mounts(&[project.clone()], &work_dir, false).expect("resolve");

    assert_eq!(mounts.len(), 1);
    assert!(mounts.contains_key(&project));
}

#[rstest]
#[cfg_attr(not(unix), ignore = "symlink creation requires unix")]
fn symlink_discovery_is_one_level_deep(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let project = root.join("project");
    let nested = project.join("nested");
    let elsewhere = root.join("elsewhere");
    std::fs::create_dir_all(&nested).expect("create nested");
    std::fs::create_dir(&elsewhere).expect("create elsewhere");
    // The symlink sits below a plain subdirectory, one level too deep.
    #[cfg(unix)]
    std::os::unix::fs::symlink(&elsewhere, nested.join("vendor")).expect("create symlink");

    let mounts = resolve_mounts(&[project.clone()], &work_dir, true).expect("resolve");

    assert_eq!(mounts.len(), 1);
    assert!(!mounts.contains_key(&elsewhere));
}

#[rstest]
#[cfg_attr(not(unix), ignore = "symlink creation requires unix")]
fn broken_and_file_symlinks_are_skipped(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let project = root.join("project");
    std::fs::create_dir(&project).expect("create project");
    std::fs::write(root.join("notes.txt"), "notes").expect("write file");
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(root.join("gone"), project.join("dangling"))
            .expect("create broken symlink");
        std::os::unix::fs::symlink(root.join("notes.txt"), project.join("notes"))
            .expect("create file symlink");
    }

    let mounts = resolve_mounts(&[project.clone()], &work_dir, true).expect("resolve");

    assert_eq!(mounts.len(), 1);
    assert!(mounts.contains_key(&project));
}

#[rstest]
fn resolution_is_order_insensitive(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let first = root.join("first");
    let second = root.join("second");
    std::fs::create_dir(&first).expect("create first");
    std::fs::create_dir(&second).expect("create second");

    let forward =
        resolve_mounts(&[first.clone(), second.clone()], &work_dir, true).expect("resolve");
    let reverse = resolve_mounts(&[second, first], &work_dir, true).expect("resolve");

    assert_eq!(forward, reverse);
}

#[rstest]
#[cfg_attr(not(unix), ignore = "symlink creation requires unix")]
fn later_entry_for_the_same_host_path_wins(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let real = root.join("real");
    let alias = root.join("alias");
    std::fs::create_dir(&real).expect("create real");
    #[cfg(unix)]
    std::os::unix::fs::symlink(&real, &alias).expect("create alias symlink");

    // Both supplied paths canonicalise to the same host key; the later
    // target replaces the earlier one.
    let mounts = resolve_mounts(&[real.clone(), alias], &work_dir, false).expect("resolve");

    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts.get(&real), Some(&work_dir.join("alias")));
}

#[rstest]
#[serial_test::serial]
fn current_directory_mounts_onto_the_work_dir_itself(work_dir: Utf8PathBuf) {
    let (_scratch, root) = scratch_dir();
    let previous = std::env::current_dir().expect("read current dir");
    std::env::set_current_dir(&root).expect("enter scratch dir");

    let result = resolve_mounts(&[Utf8PathBuf::from(".")], &work_dir, false);

    std::env::set_current_dir(previous).expect("restore current dir");

    let mounts = result.expect("resolve");
    assert_eq!(mounts.get(&root), Some(&work_dir));
}

/// The work directory parameter is used verbatim; nothing requires it to
/// exist on the host.
#[rstest]
fn work_dir_is_not_required_to_exist() {
    let (_scratch, root) = scratch_dir();
    let project = root.join("project");
    std::fs::create_dir(&project).expect("create project");

    let mounts =
        resolve_mounts(&[project], Utf8Path::new("/nowhere/special"), false).expect("resolve");

    assert_eq!(mounts.len(), 1);
}
