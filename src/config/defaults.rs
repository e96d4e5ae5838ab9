//! Built-in defaults for every recognised option.
//!
//! The registry is frozen data: literal constants plus a handful of lazily
//! computed defaults (effective uid/gid, the image name inferred from the
//! working directory). Nothing here is mutable and nothing here consults the
//! other configuration layers.

use std::path::Path;

/// Directory searched for the per-project configuration inputs.
pub const CONFIG_DIRECTORY: &str = "container-build";

/// Default apt key directory, used only if it exists.
pub const DEFAULT_APT_KEYS: &str = "container-build/apt-keys";

/// Default apt sources file, used only if it exists.
pub const DEFAULT_APT_SOURCES_FILE: &str = "container-build/sources.list";

/// Default base image the container derives from.
pub const DEFAULT_BASE_IMAGE: &str = "debian:stretch-slim";

/// Default config file path, used only if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "container-build/build.cfg";

/// Default docker executable.
pub const DEFAULT_DOCKER: &str = "docker";

/// Default daemon socket address.
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Default extra flags passed to `docker run`.
pub const DEFAULT_DOCKER_RUN_FLAGS: &str = "--interactive --tty --rm --env LC_ALL=C.UTF-8";

/// Default home directory inside the container.
pub const DEFAULT_HOME_DIR: &str = "/home/build";

/// Default install script path, used only if it exists.
pub const DEFAULT_INSTALL_SCRIPT: &str = "container-build/install.sh";

/// Default packages file path (not existence-gated; reading it may fail).
pub const DEFAULT_PACKAGES_FILE: &str = "container-build/packages";

/// Default shell used to run the command in the container.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Default username the host identity maps to inside the container.
pub const DEFAULT_USERNAME: &str = "build";

/// Default working directory, relative to the home directory.
pub const DEFAULT_WORK_DIR: &str = "src";

/// Infer the image name from the current working directory.
///
/// The name is the working directory's final component suffixed with
/// `-builder`; when the working directory cannot be determined the name
/// falls back to `container-builder`.
#[must_use]
pub fn default_image_name() -> String {
    let cwd = std::env::current_dir().ok();
    let dir_name = cwd
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .unwrap_or("container");
    format!("{dir_name}-builder")
}

/// The effective uid of the invoking process.
#[cfg(unix)]
#[must_use]
pub fn current_uid() -> u32 {
    // SAFETY: geteuid() is a simple POSIX getter that always succeeds and has
    // no side effects.
    unsafe { libc::geteuid() }
}

/// The effective gid of the invoking process.
#[cfg(unix)]
#[must_use]
pub fn current_gid() -> u32 {
    // SAFETY: getegid() is a simple POSIX getter that always succeeds and has
    // no side effects.
    unsafe { libc::getegid() }
}

/// The effective uid of the invoking process (unsupported platform stub).
#[cfg(not(unix))]
#[must_use]
pub fn current_uid() -> u32 {
    0
}

/// The effective gid of the invoking process (unsupported platform stub).
#[cfg(not(unix))]
#[must_use]
pub fn current_gid() -> u32 {
    0
}
