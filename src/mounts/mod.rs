//! Bind-mount set resolution.
//!
//! Turns the configured list of host paths into a conflict-free mapping of
//! canonical host path → container path under the working directory. A
//! bind-mounted directory tree does not dereference symlinks that point
//! outside it; a build relying on such links (for example to another source
//! checkout) needs the link targets independently mounted so the container
//! sees live content rather than a dangling link. Mount resolution therefore
//! optionally expands symlinked subdirectories one level deep.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{FilesystemError, Result};

/// The resolved mapping of canonical host path → container path.
///
/// Map keys are unique by construction; a later insertion for the same host
/// path silently overwrites the earlier one.
pub type MountMap = BTreeMap<Utf8PathBuf, Utf8PathBuf>;

/// Resolve the configured host paths into the final bind-mount mapping.
///
/// Each supplied path canonicalises to the map key; the container target is
/// `container_work_dir` joined with the supplied path's final component (a
/// path with no final component, such as `.`, lands on the working directory
/// itself). With `expand_symlinks`, every direct child of a mounted directory
/// that is a symlink resolving to a directory is additionally mounted at the
/// corresponding path under its parent's target. Discovery is one level deep:
/// children of children are not scanned.
///
/// # Errors
///
/// Returns `FilesystemError::NotFound` when a supplied host path does not
/// exist; the whole invocation aborts rather than producing a container with
/// a missing mount source. Other I/O failures surface as
/// `FilesystemError::Io`.
pub fn resolve_mounts(
    host_paths: &[Utf8PathBuf],
    container_work_dir: &Utf8Path,
    expand_symlinks: bool,
) -> Result<MountMap> {
    let mut mounts = MountMap::new();

    for supplied in host_paths {
        let source = canonicalize(supplied)?;
        let target = match supplied.file_name() {
            Some(name) => container_work_dir.join(name),
            None => container_work_dir.to_owned(),
        };
        mounts.insert(source.clone(), target.clone());

        if expand_symlinks && source.is_dir() {
            expand_symlinked_children(&source, &target, &mut mounts)?;
        }
    }

    Ok(mounts)
}

/// Add a mount for every direct child of `source` that is a symlink
/// resolving to a directory. Broken symlinks are skipped.
fn expand_symlinked_children(
    source: &Utf8Path,
    target: &Utf8Path,
    mounts: &mut MountMap,
) -> Result<()> {
    let entries = source.read_dir_utf8().map_err(|error| io_error(source, &error))?;

    for entry_result in entries {
        let entry = entry_result.map_err(|error| io_error(source, &error))?;
        let file_type = entry.file_type().map_err(|error| io_error(entry.path(), &error))?;
        if !file_type.is_symlink() {
            continue;
        }
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        if !metadata.is_dir() {
            continue;
        }
        let resolved = canonicalize(entry.path())?;
        mounts.insert(resolved, target.join(entry.file_name()));
    }

    Ok(())
}

/// Canonicalise a host path, mapping a missing path to the terminal
/// "path not found" failure.
fn canonicalize(path: &Utf8Path) -> Result<Utf8PathBuf> {
    path.canonicalize_utf8().map_err(|error| {
        if error.kind() == io::ErrorKind::NotFound {
            FilesystemError::NotFound {
                path: path.to_owned(),
            }
            .into()
        } else {
            io_error(path, &error)
        }
    })
}

fn io_error(path: &Utf8Path, error: &io::Error) -> crate::error::ContainerBuildError {
    FilesystemError::Io {
        path: path.to_owned(),
        message: error.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests;
