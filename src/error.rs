//! Semantic error types for container-build.
//!
//! Each concern gets its own semantic error enum (via `thiserror`) so callers
//! can match on the condition; the binary boundary converts everything into an
//! `eyre::Report` for human-readable output. The taxonomy follows the three
//! terminal failure classes of the tool: configuration errors, filesystem
//! resolution errors, and external process failures.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while resolving or validating the effective configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file text could not be parsed as an ini document.
    ///
    /// Resolution never propagates this directly — a malformed config file
    /// degrades to a document with zero sections — but loaders and tests
    /// observe it.
    #[error("failed to parse config file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A resolved value has the wrong shape or fails to parse for its option.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The kebab-case option name.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The packages file could not be read.
    #[error("error opening packages file '{path}': {message}")]
    PackagesFileUnreadable {
        /// The packages file path.
        path: Utf8PathBuf,
        /// A description of the read failure.
        message: String,
    },

    /// The resolved uid or gid is 0.
    #[error("cannot run command as root in container (use the --uid and --gid arguments)")]
    RootUser,

    /// The daemon address has a scheme other than `unix`.
    #[error("passthrough of daemon socket scheme '{scheme}' not supported")]
    UnsupportedSocketScheme {
        /// The offending scheme (empty when the address has none).
        scheme: String,
    },

    /// The daemon socket is owned by another user and not group-writable.
    #[error("passthrough of daemon socket '{path}' not writable by group owner unsupported")]
    SocketNotGroupWritable {
        /// The socket path.
        path: Utf8PathBuf,
    },

    /// The daemon socket is owned by another user and by group 0.
    #[error("passthrough of daemon socket '{path}' owned by group 0 not supported")]
    SocketGroupRoot {
        /// The socket path.
        path: Utf8PathBuf,
    },
}

/// Errors raised while resolving paths on the host filesystem.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// A path that must exist was not found.
    #[error("path not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: Utf8PathBuf,
    },

    /// An I/O error occurred at a path.
    #[error("I/O error at '{path}': {message}")]
    Io {
        /// The path where the error occurred.
        path: Utf8PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Errors raised by the external container tool invocations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The external executable could not be started at all.
    #[error("failed to invoke '{program}': {message}")]
    SpawnFailed {
        /// The configured executable.
        program: String,
        /// A description of the spawn failure.
        message: String,
    },

    /// The image build step exited with a non-zero status.
    #[error("docker build returned {code}")]
    BuildFailed {
        /// The child process exit code.
        code: i32,
    },

    /// The container run step exited with a non-zero status.
    #[error("docker run returned {code}")]
    RunFailed {
        /// The child process exit code.
        code: i32,
    },
}

/// Top-level error type for the container-build application.
#[derive(Debug, Error)]
pub enum ContainerBuildError {
    /// An error occurred during configuration resolution or validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while resolving host filesystem paths.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// An external process invocation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ContainerBuildError {
    /// The process exit code this error maps to.
    ///
    /// A failing external process propagates its own exit code; every other
    /// failure class exits 1. Codes outside the `u8` range collapse to 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Engine(EngineError::BuildFailed { code } | EngineError::RunFailed { code }) => {
                u8::try_from(*code).unwrap_or(1)
            }
            Self::Config(_)
            | Self::Filesystem(_)
            | Self::Engine(EngineError::SpawnFailed { .. }) => 1,
        }
    }
}

/// A specialised `Result` type for container-build operations.
pub type Result<T> = std::result::Result<T, ContainerBuildError>;

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Report;
    use rstest::{fixture, rstest};

    /// Fixture providing a sample daemon socket path.
    #[fixture]
    fn socket_path() -> Utf8PathBuf {
        Utf8PathBuf::from("/var/run/docker.sock")
    }

    #[rstest]
    fn config_error_invalid_value_displays_correctly() {
        let error = ConfigError::InvalidValue {
            field: String::from("uid"),
            reason: String::from("expected an unsigned integer, got 'many'"),
        };
        assert_eq!(
            error.to_string(),
            "invalid value for 'uid': expected an unsigned integer, got 'many'"
        );
    }

    #[rstest]
    fn config_error_root_user_displays_correctly() {
        assert_eq!(
            ConfigError::RootUser.to_string(),
            "cannot run command as root in container (use the --uid and --gid arguments)"
        );
    }

    #[rstest]
    #[case("tcp", "passthrough of daemon socket scheme 'tcp' not supported")]
    #[case("", "passthrough of daemon socket scheme '' not supported")]
    fn config_error_unsupported_scheme_displays_scheme(
        #[case] scheme: &str,
        #[case] expected: &str,
    ) {
        let error = ConfigError::UnsupportedSocketScheme {
            scheme: String::from(scheme),
        };
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn filesystem_error_not_found_displays_path() {
        let error = FilesystemError::NotFound {
            path: Utf8PathBuf::from("/src/missing"),
        };
        assert_eq!(error.to_string(), "path not found: /src/missing");
    }

    #[rstest]
    fn engine_error_build_failed_displays_code() {
        let error = EngineError::BuildFailed { code: 125 };
        assert_eq!(error.to_string(), "docker build returned 125");
    }

    #[rstest]
    fn top_level_error_wraps_socket_errors(socket_path: Utf8PathBuf) {
        let error: ContainerBuildError = ConfigError::SocketGroupRoot { path: socket_path }.into();
        assert_eq!(
            error.to_string(),
            "passthrough of daemon socket '/var/run/docker.sock' owned by group 0 not supported"
        );
    }

    #[rstest]
    #[case(ContainerBuildError::from(ConfigError::RootUser), 1)]
    #[case(ContainerBuildError::from(EngineError::BuildFailed { code: 125 }), 125)]
    #[case(ContainerBuildError::from(EngineError::RunFailed { code: 2 }), 2)]
    #[case(ContainerBuildError::from(EngineError::RunFailed { code: 512 }), 1)]
    #[case(
        ContainerBuildError::from(EngineError::SpawnFailed {
            program: String::from("docker"),
            message: String::from("No such file or directory"),
        }),
        1
    )]
    fn exit_code_mirrors_external_process(
        #[case] error: ContainerBuildError,
        #[case] expected: u8,
    ) {
        assert_eq!(error.exit_code(), expected);
    }

    #[rstest]
    fn eyre_report_preserves_error_messages() {
        let error = ContainerBuildError::from(FilesystemError::NotFound {
            path: Utf8PathBuf::from("/work/missing"),
        });
        let report = Report::from(error);
        assert_eq!(report.to_string(), "path not found: /work/missing");
    }
}
