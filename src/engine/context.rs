//! Build-context directory management.
//!
//! The build context holds the rendered Dockerfile plus every file the image
//! build copies in (apt sources, apt keys, install scripts). Without
//! `--directory` the context is a scratch temporary directory removed when
//! the invocation ends; a user-specified directory is created if needed and
//! left intact afterwards so a failed build can be inspected.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::error::{FilesystemError, Result};

/// A directory receiving the generated build inputs.
#[derive(Debug)]
pub struct BuildContext {
    root: Utf8PathBuf,
    /// Present only for scratch contexts; dropping it removes the directory.
    _scratch: Option<TempDir>,
}

impl BuildContext {
    /// Create the build context.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::Io` when the user-specified directory cannot
    /// be created, the scratch directory cannot be allocated, or the scratch
    /// path is not valid UTF-8.
    pub fn create(directory: Option<&Utf8Path>) -> Result<Self> {
        match directory {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|error| FilesystemError::Io {
                    path: dir.to_owned(),
                    message: error.to_string(),
                })?;
                Ok(Self {
                    root: dir.to_owned(),
                    _scratch: None,
                })
            }
            None => {
                let scratch = tempfile::tempdir().map_err(|error| FilesystemError::Io {
                    path: Utf8PathBuf::from("<temp>"),
                    message: error.to_string(),
                })?;
                let root = Utf8PathBuf::try_from(scratch.path().to_path_buf()).map_err(
                    |error| FilesystemError::Io {
                        path: Utf8PathBuf::from("<temp>"),
                        message: error.to_string(),
                    },
                )?;
                Ok(Self {
                    root,
                    _scratch: Some(scratch),
                })
            }
        }
    }

    /// The context root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write the Dockerfile into the context and return its path.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::Io` when the file cannot be written.
    pub fn write_dockerfile(&self, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join("Dockerfile");
        fs::write(&path, contents).map_err(|error| FilesystemError::Io {
            path: path.clone(),
            message: error.to_string(),
        })?;
        Ok(path)
    }

    /// Copy a host file to a context-relative destination, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::Io` when a parent directory cannot be
    /// created or the copy fails.
    pub fn copy_file(&self, source: &Utf8Path, staged: &Utf8Path) -> Result<()> {
        let destination = self.root.join(staged);
        tracing::debug!("copying file '{source}' to build context '{destination}'");

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|error| FilesystemError::Io {
                path: parent.to_owned(),
                message: error.to_string(),
            })?;
        }
        fs::copy(source, &destination).map_err(|error| FilesystemError::Io {
            path: source.to_owned(),
            message: error.to_string(),
        })?;
        Ok(())
    }
}
