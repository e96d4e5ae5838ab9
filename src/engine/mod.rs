//! External container tool invocation.
//!
//! The build and run steps shell out to the configured `docker` executable as
//! sequential, blocking child processes: the run step only begins after the
//! build step completes successfully. The contract with the external tool is
//! argv in, exit status out; a non-zero exit is surfaced with the phase that
//! failed and the child's exit code.

mod context;
mod passthrough;


use std::process::{Command, ExitStatus, Stdio};

use camino::Utf8Path;

use crate::error::{ConfigError, EngineError, Result};
use crate::mounts::MountMap;

pub use context::BuildContext;
pub use passthrough::{SocketPassthrough, resolve_passthrough};

/// Parameters for the external image build.
#[derive(Debug)]
pub struct BuildRequest<'a> {
    /// Tag for the generated image.
    pub image_name: &'a str,
    /// Build-context directory.
    pub context_dir: &'a Utf8Path,
    /// Path of the rendered Dockerfile.
    pub dockerfile: &'a Utf8Path,
    /// UID build argument.
    pub uid: u32,
    /// GID build argument.
    pub gid: u32,
    /// Suppress build output (`--quiet` plus a discarded stdout).
    pub quiet: bool,
}

/// Parameters for the external container run.
#[derive(Debug)]
pub struct RunRequest<'a> {
    /// Image to run.
    pub image_name: &'a str,
    /// Extra run flags, split with shell quoting rules.
    pub run_flags: &'a str,
    /// Supplementary groups for the container user.
    pub groups: &'a [String],
    /// Bind mounts, host path → container path.
    pub mounts: &'a MountMap,
    /// Command to run; empty defers to the image CMD.
    pub command: &'a [String],
}

/// Invokes the external container tool.
#[derive(Debug)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    /// Create an invoker for the given executable.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the image from the staged context.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SpawnFailed` when the executable cannot be
    /// started and `EngineError::BuildFailed` carrying the child's exit code
    /// when the build returns non-zero.
    pub fn build_image(&self, request: &BuildRequest<'_>) -> Result<()> {
        let mut args = vec![
            String::from("build"),
            String::from("--build-arg"),
            format!("UID={}", request.uid),
            String::from("--build-arg"),
            format!("GID={}", request.gid),
            String::from("--tag"),
            request.image_name.to_owned(),
            String::from("--file"),
            request.dockerfile.to_string(),
        ];
        if request.quiet {
            args.push(String::from("--quiet"));
        }
        args.push(request.context_dir.to_string());

        tracing::info!("running {} {}", self.program, args.join(" "));

        let mut command = Command::new(&self.program);
        command.args(&args);
        if request.quiet {
            command.stdout(Stdio::null());
        }

        let status = self.wait(&mut command)?;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::BuildFailed {
                code: exit_code(status),
            }
            .into())
        }
    }

    /// Run the command in a container of the built image.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the run-flags string cannot
    /// be split with shell quoting rules, `EngineError::SpawnFailed` when the
    /// executable cannot be started, and `EngineError::RunFailed` carrying
    /// the child's exit code when the run returns non-zero.
    pub fn run_container(&self, request: &RunRequest<'_>) -> Result<()> {
        let run_flags =
            shell_words::split(request.run_flags).map_err(|error| ConfigError::InvalidValue {
                field: String::from("docker-run-flags"),
                reason: error.to_string(),
            })?;

        let mut args = vec![String::from("run")];
        if !request.groups.is_empty() {
            args.push(String::from("--group-add"));
            args.push(request.groups.join(","));
        }
        args.extend(run_flags);
        for (host_path, container_path) in request.mounts {
            args.push(String::from("--volume"));
            args.push(format!("{host_path}:{container_path}"));
        }
        args.push(request.image_name.to_owned());
        args.extend(request.command.iter().cloned());

        tracing::info!("running {} {}", self.program, args.join(" "));

        let status = self.wait(Command::new(&self.program).args(&args))?;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::RunFailed {
                code: exit_code(status),
            }
            .into())
        }
    }

    /// Spawn the child and block until it exits.
    fn wait(&self, command: &mut Command) -> Result<ExitStatus> {
        command.status().map_err(|error| {
            EngineError::SpawnFailed {
                program: self.program.clone(),
                message: error.to_string(),
            }
            .into()
        })
    }
}

/// The child's exit code; signal-terminated children report 1.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
