//! Command-line argument definitions for container-build.
//!
//! Every recognised option has a long-form flag whose name matches the
//! kebab-case option key. Optional fields distinguish "flag was given" from
//! any particular value, so the resolver can apply precedence without falsy
//! suppression.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};

/// Command-line interface for container-build.
#[derive(Debug, Parser)]
#[command(name = "container-build")]
#[command(
    author,
    version,
    about = "Run a command within a generated container, geared toward build systems"
)]
#[command(after_help = "\
Environment variables:
  DOCKER                Path to docker executable. Defaults to 'docker'.
  DOCKER_RUN_FLAGS      Extra flags to pass to the 'docker run' command.
  DOCKER_HOST           Daemon socket to connect to.

The config file is ini-style text and can contain any long-form option name.
Only the first section in the config file is used.")]
pub struct Cli {
    /// Command to run within the container.
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,

    /// Path of config file. Defaults to 'container-build/build.cfg', if it exists.
    #[arg(short = 'c', long)]
    pub config_file: Option<Utf8PathBuf>,

    /// Suppress using the default config file path.
    #[arg(long, num_args = 0, default_missing_value = "true")]
    pub no_config_file: Option<bool>,

    /// Name of the generated container image. Defaults to the name of the
    /// current working directory suffixed with '-builder'.
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Path of a directory to write generated files. Defaults to using a
    /// temporary directory.
    #[arg(short = 'd', long)]
    pub directory: Option<Utf8PathBuf>,

    /// Path of an extra script to run as root in the container during image
    /// creation. May be specified multiple times. Defaults to
    /// 'container-build/install.sh', if it exists.
    #[arg(long = "install-script")]
    pub install_script: Vec<Utf8PathBuf>,

    /// Suppress using the default install script path.
    #[arg(long, num_args = 0, default_missing_value = "true")]
    pub no_install_script: Option<bool>,

    /// Base image to derive the container from.
    #[arg(long)]
    pub base_image: Option<String>,

    /// Apt package specification of a package to install in the container.
    /// May be specified multiple times.
    #[arg(short = 'p', long = "package")]
    pub package: Vec<String>,

    /// Path of a file containing apt package specifications to install in the
    /// container.
    #[arg(long)]
    pub packages_file: Option<Utf8PathBuf>,

    /// Path of an apt sources.list to use during package installation in the
    /// container. Defaults to 'container-build/sources.list', if it exists.
    #[arg(long)]
    pub apt_sources_file: Option<Utf8PathBuf>,

    /// Suppress using the default apt sources path.
    #[arg(long, num_args = 0, default_missing_value = "true")]
    pub no_apt_sources_file: Option<bool>,

    /// Path of a directory containing .gpg files to install using apt-key in
    /// the container. Defaults to 'container-build/apt-keys', if it exists.
    #[arg(long)]
    pub apt_keys: Option<Utf8PathBuf>,

    /// Suppress using the default apt keys path.
    #[arg(long, num_args = 0, default_missing_value = "true")]
    pub no_apt_keys: Option<bool>,

    /// UID used to run the command in the container. Defaults to the current
    /// effective uid.
    #[arg(short = 'u', long)]
    pub uid: Option<u32>,

    /// GID used to run the command in the container. Defaults to the current
    /// effective gid.
    #[arg(short = 'g', long)]
    pub gid: Option<u32>,

    /// Username used to run the command in the container.
    #[arg(long)]
    pub username: Option<String>,

    /// Path of the home directory used in the container.
    #[arg(long)]
    pub home_dir: Option<Utf8PathBuf>,

    /// Path of the shell used to run the command in the container.
    #[arg(long)]
    pub shell: Option<Utf8PathBuf>,

    /// Path of the working directory to run the command in, optionally
    /// relative to the home directory.
    #[arg(long)]
    pub work_dir: Option<Utf8PathBuf>,

    /// Directory to bind mount under the working directory in the container.
    /// May be specified multiple times. Defaults to the current directory.
    #[arg(short = 'm', long = "mount")]
    pub mount: Vec<Utf8PathBuf>,

    /// Suppress recursively mounting symlinks to directories outside their
    /// containing mount.
    #[arg(long, num_args = 0, default_missing_value = "true")]
    pub no_recursive_mount: Option<bool>,

    /// Path of the docker executable.
    #[arg(long)]
    pub docker: Option<String>,

    /// Daemon socket address to connect to.
    #[arg(long)]
    pub docker_host: Option<String>,

    /// Extra flags to pass to the 'docker run' command.
    #[arg(long)]
    pub docker_run_flags: Option<String>,

    /// Mount the daemon unix socket from the host inside the container, and
    /// add the user to the group owning the socket inside the container.
    #[arg(long, num_args = 0, default_missing_value = "true")]
    pub docker_passthrough: Option<bool>,

    /// Enable verbose output. May be specified multiple times for more
    /// verbosity.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}
