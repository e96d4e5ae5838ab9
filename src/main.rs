//! `container-build` application entry point.
//!
//! Parses the command line, resolves the effective configuration with layered
//! precedence (CLI > environment > config file > defaults), then hands over
//! to the orchestration layer. Domain errors stay semantic until this
//! boundary, where they become an `eyre` report for the user; a failing
//! external process propagates its own exit code as the tool's.

use std::process::ExitCode;

use clap::Parser;
use container_build::config::{Cli, EffectiveConfig, load_effective};
use container_build::error::{ContainerBuildError, Result as BuildResult};
use eyre::Report;
use mockable::DefaultEnv;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = DefaultEnv::new();

    match run(&cli, &env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error.exit_code();
            report(error);
            ExitCode::from(code)
        }
    }
}

/// Resolve configuration and execute the build-and-run flow.
fn run<E: mockable::Env>(cli: &Cli, env: &E) -> BuildResult<()> {
    let opts = load_effective(cli, env)?;
    init_tracing(opts.verbose);
    log_config_file(&opts);
    container_build::api::build_and_run(&opts)
}

/// Initialise diagnostics on stderr.
///
/// The verbosity counter maps to a default level (`warn`, `-v` info, `-vv`
/// debug); `RUST_LOG` overrides it when set.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Record which config file fed the resolution, if any.
fn log_config_file(opts: &EffectiveConfig) {
    if let Some(path) = &opts.config_file {
        tracing::info!("read config file {path}");
    }
}

/// Report a terminal failure to the user.
#[expect(clippy::print_stderr, reason = "CLI error reporting is the intended behaviour")]
fn report(error: ContainerBuildError) {
    eprintln!("Error: {}", Report::from(error));
}
