//! The effective configuration snapshot.

use camino::Utf8PathBuf;

use crate::error::{ConfigError, Result};

use super::cli::Cli;
use super::defaults;
use super::file::ConfigFile;
use super::resolver::{Resolved, Resolver};

/// The fully resolved, precedence-merged set of all options for one
/// invocation.
///
/// Created once per invocation by [`EffectiveConfig::resolve`], consumed
/// read-only by every downstream component, never mutated after creation.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Directory of .gpg files to register with apt-key, if configured.
    pub apt_keys_dir: Option<Utf8PathBuf>,

    /// Apt sources.list used during package installation, if configured.
    pub apt_sources_file: Option<Utf8PathBuf>,

    /// Base image the container derives from.
    pub base_image: String,

    /// Directory generated files are written to; a scratch temporary
    /// directory is used when absent.
    pub build_directory: Option<Utf8PathBuf>,

    /// Command to run within the container; the image CMD applies when empty.
    pub command: Vec<String>,

    /// The config file that was actually read, if any.
    pub config_file: Option<Utf8PathBuf>,

    /// Path of the docker executable.
    pub docker: String,

    /// Daemon socket address.
    pub docker_host: String,

    /// Whether to forward the daemon socket into the container.
    pub docker_passthrough: bool,

    /// Extra flags passed to `docker run`, split with shell quoting rules.
    pub docker_run_flags: String,

    /// Extra package specifications supplied via `--package`.
    pub extra_packages: Vec<String>,

    /// GID used to run the command in the container.
    pub gid: u32,

    /// Home directory inside the container.
    pub home_dir: Utf8PathBuf,

    /// Name of the generated container image.
    pub image_name: String,

    /// Install scripts run as root during image creation.
    pub install_scripts: Vec<Utf8PathBuf>,

    /// Host paths to bind mount under the container working directory.
    pub mounts: Vec<Utf8PathBuf>,

    /// Whether symlinked subdirectories are left unmounted.
    pub no_recursive_mount: bool,

    /// File containing apt package specifications.
    pub packages_file: Utf8PathBuf,

    /// Shell used to run the command in the container.
    pub shell: Utf8PathBuf,

    /// UID used to run the command in the container.
    pub uid: u32,

    /// Username the host identity maps to inside the container.
    pub username: String,

    /// Verbosity level.
    pub verbose: u8,

    /// Working directory for the command, optionally relative to the home
    /// directory.
    pub work_dir: Utf8PathBuf,
}

impl EffectiveConfig {
    /// Resolve every option through the layered precedence chain.
    ///
    /// `config_file` is the path the document in `file` was read from; it is
    /// recorded as the resolved value of the `config-file` option.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a typed option (`uid`, `gid`,
    /// `verbose`) resolves to text that does not parse, or when a scalar
    /// option resolves to a bare flag.
    pub fn resolve<E: mockable::Env>(
        cli: &Cli,
        file: &ConfigFile,
        env: &E,
        config_file: Option<Utf8PathBuf>,
    ) -> Result<Self> {
        let resolver = Resolver::new(cli, file, env);

        let mounts = match resolver.get("mount") {
            None => vec![Utf8PathBuf::from(".")],
            Some(value) => list_value(value).into_iter().map(Utf8PathBuf::from).collect(),
        };

        Ok(Self {
            apt_keys_dir: resolver.file_default("apt-keys", defaults::DEFAULT_APT_KEYS.as_ref()),
            apt_sources_file: resolver
                .file_default("apt-sources-file", defaults::DEFAULT_APT_SOURCES_FILE.as_ref()),
            base_image: text_or(&resolver, "base-image", defaults::DEFAULT_BASE_IMAGE)?,
            build_directory: optional_path(&resolver, "directory")?,
            command: resolver.list("command"),
            config_file,
            docker: text_or(&resolver, "docker", defaults::DEFAULT_DOCKER)?,
            docker_host: text_or(&resolver, "docker-host", defaults::DEFAULT_DOCKER_HOST)?,
            docker_passthrough: resolver.flag("docker-passthrough"),
            docker_run_flags: text_or(
                &resolver,
                "docker-run-flags",
                defaults::DEFAULT_DOCKER_RUN_FLAGS,
            )?,
            extra_packages: resolver.list("package"),
            gid: uint_or_else(&resolver, "gid", defaults::current_gid)?,
            home_dir: Utf8PathBuf::from(text_or(&resolver, "home-dir", defaults::DEFAULT_HOME_DIR)?),
            image_name: match resolver.get("name") {
                Some(value) => text_value("name", value)?,
                None => defaults::default_image_name(),
            },
            install_scripts: resolver.file_default_list(
                "install-script",
                &[defaults::DEFAULT_INSTALL_SCRIPT.as_ref()],
            ),
            mounts,
            no_recursive_mount: resolver.flag("no-recursive-mount"),
            packages_file: Utf8PathBuf::from(text_or(
                &resolver,
                "packages-file",
                defaults::DEFAULT_PACKAGES_FILE,
            )?),
            shell: Utf8PathBuf::from(text_or(&resolver, "shell", defaults::DEFAULT_SHELL)?),
            uid: uint_or_else(&resolver, "uid", defaults::current_uid)?,
            username: text_or(&resolver, "username", defaults::DEFAULT_USERNAME)?,
            verbose: verbose_level(&resolver)?,
            work_dir: Utf8PathBuf::from(text_or(&resolver, "work-dir", defaults::DEFAULT_WORK_DIR)?),
        })
    }

    /// Reject values the rest of the pipeline must never see.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RootUser` when the resolved uid or gid is 0.
    pub fn validate(&self) -> Result<()> {
        if self.uid == 0 || self.gid == 0 {
            return Err(ConfigError::RootUser.into());
        }
        Ok(())
    }

    /// The working directory inside the container.
    ///
    /// Relative `work-dir` values land under the home directory; absolute
    /// values stand alone.
    #[must_use]
    pub fn container_work_dir(&self) -> Utf8PathBuf {
        self.home_dir.join(&self.work_dir)
    }
}

/// Coerce a resolved value to a single string.
fn text_value(field: &str, value: Resolved) -> Result<String> {
    match value {
        Resolved::Text(text) => Ok(text),
        Resolved::Uint(number) => Ok(number.to_string()),
        Resolved::Flag(_) | Resolved::List(_) => Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: String::from("expected a single value"),
        }
        .into()),
    }
}

/// Resolve a scalar option with a literal default.
fn text_or<E: mockable::Env>(
    resolver: &Resolver<'_, E>,
    field: &str,
    default: &str,
) -> Result<String> {
    match resolver.get(field) {
        Some(value) => text_value(field, value),
        None => Ok(default.to_owned()),
    }
}

/// Resolve an optional path-valued option with no default.
fn optional_path<E: mockable::Env>(
    resolver: &Resolver<'_, E>,
    field: &str,
) -> Result<Option<Utf8PathBuf>> {
    match resolver.get(field) {
        Some(value) => text_value(field, value).map(|text| Some(Utf8PathBuf::from(text))),
        None => Ok(None),
    }
}

/// Resolve an unsigned-integer option with a lazily computed default.
fn uint_or_else<E: mockable::Env>(
    resolver: &Resolver<'_, E>,
    field: &str,
    default: impl FnOnce() -> u32,
) -> Result<u32> {
    match resolver.get(field) {
        Some(Resolved::Uint(number)) => Ok(number),
        Some(Resolved::Text(text)) => text.trim().parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: field.to_owned(),
                reason: format!("expected an unsigned integer, got '{text}'"),
            }
            .into()
        }),
        Some(_) => Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: String::from("expected an unsigned integer"),
        }
        .into()),
        None => Ok(default()),
    }
}

/// Resolve the verbosity counter.
fn verbose_level<E: mockable::Env>(resolver: &Resolver<'_, E>) -> Result<u8> {
    match resolver.get("verbose") {
        Some(Resolved::Uint(number)) => u8::try_from(number).map_err(|_| {
            ConfigError::InvalidValue {
                field: String::from("verbose"),
                reason: format!("verbosity level {number} out of range"),
            }
            .into()
        }),
        Some(Resolved::Text(text)) => text.trim().parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: String::from("verbose"),
                reason: format!("expected an unsigned integer, got '{text}'"),
            }
            .into()
        }),
        Some(_) => Err(ConfigError::InvalidValue {
            field: String::from("verbose"),
            reason: String::from("expected an unsigned integer"),
        }
        .into()),
        None => Ok(0),
    }
}

/// Coerce a resolved value to a sequence, matching the `list` accessor.
fn list_value(value: Resolved) -> Vec<String> {
    match value {
        Resolved::List(values) => values,
        Resolved::Text(text) => vec![text],
        Resolved::Uint(number) => vec![number.to_string()],
        Resolved::Flag(_) => Vec::new(),
    }
}
