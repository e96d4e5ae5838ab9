//! Per-option precedence resolution.
//!
//! Every option resolves through the same lazily evaluated chain, first hit
//! wins:
//!
//! 1. an explicit command-line value ("was the flag given", never falsy
//!    suppression),
//! 2. the option's declared environment variable, if it declares one,
//! 3. the active section of the loaded config file (a bare key resolves to
//!    boolean true),
//! 4. the caller-supplied default, which for file-default options is gated on
//!    the path existing and suppressed entirely by the matching `--no-X`
//!    negation.
//!
//! There is no reflection anywhere: the command-line lookup is an explicit
//! match over option names, and the environment layer is a static table in
//! the style of the option registry.

use camino::{Utf8Path, Utf8PathBuf};

use super::cli::Cli;
use super::file::{ConfigFile, ConfigValue};

/// Options that declare an environment variable, and the variable consulted.
///
/// The variable name is the upper-snake-case form of the option name.
const OPTION_ENV_VARS: &[(&str, &str)] = &[
    ("docker", "DOCKER"),
    ("docker-host", "DOCKER_HOST"),
    ("docker-run-flags", "DOCKER_RUN_FLAGS"),
];

/// A value produced by one of the configuration layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A single textual value.
    Text(String),
    /// A sequence of textual values (repeatable flags, trailing arguments).
    List(Vec<String>),
    /// A boolean flag; bare config keys resolve to `Flag(true)`.
    Flag(bool),
    /// An unsigned integer supplied as such on the command line.
    Uint(u32),
}

/// Resolves option values through the layered precedence chain.
///
/// # Type Parameters
///
/// * `E` - An environment provider implementing the `mockable::Env` trait,
///   allowing for testable environment variable access.
pub struct Resolver<'a, E: mockable::Env> {
    cli: &'a Cli,
    file: &'a ConfigFile,
    env: &'a E,
}

impl<'a, E: mockable::Env> Resolver<'a, E> {
    /// Creates a resolver over the parsed command line, the loaded config
    /// file, and an environment provider.
    #[must_use]
    pub const fn new(cli: &'a Cli, file: &'a ConfigFile, env: &'a E) -> Self {
        Self { cli, file, env }
    }

    /// Resolve an option through the precedence chain.
    ///
    /// Returns `None` when no layer provides a value; built-in defaults are
    /// the caller's concern.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Resolved> {
        self.from_cli(name)
            .or_else(|| self.from_env(name))
            .or_else(|| self.from_file(name))
    }

    /// Resolve an option, coerced to a boolean flag.
    ///
    /// True iff the resolved value is literally true or any non-absent value
    /// (bare-key ini entries count as present).
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        match self.get(name) {
            Some(Resolved::Flag(value)) => value,
            Some(_) => true,
            None => false,
        }
    }

    /// Resolve an option, coerced to a sequence.
    ///
    /// A literal sequence stays as-is, a single scalar becomes a one-element
    /// sequence, and absence (or a bare flag) becomes the empty sequence.
    #[must_use]
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Resolved::List(values)) => values,
            Some(Resolved::Text(value)) => vec![value],
            Some(Resolved::Uint(value)) => vec![value.to_string()],
            Some(Resolved::Flag(_)) | None => Vec::new(),
        }
    }

    /// Resolve a file-default option: the default path applies only if a
    /// filesystem entity exists there, and the `--no-{name}` negation
    /// suppresses the default entirely.
    ///
    /// The negation is consulted only when no explicit/env/config value was
    /// found; it may itself come from the command line or a bare config key.
    #[must_use]
    pub fn file_default(&self, name: &str, default: &Utf8Path) -> Option<Utf8PathBuf> {
        match self.get(name) {
            Some(Resolved::Text(value)) => Some(Utf8PathBuf::from(value)),
            Some(_) => None,
            None => {
                if self.flag(&format!("no-{name}")) {
                    None
                } else if default.exists() {
                    Some(default.to_owned())
                } else {
                    None
                }
            }
        }
    }

    /// Resolve a file-default list option: the subset of candidate default
    /// paths that exist on disk, in their original order, or empty when none
    /// exist. Skipped candidates are not reported.
    #[must_use]
    pub fn file_default_list(&self, name: &str, candidates: &[&Utf8Path]) -> Vec<Utf8PathBuf> {
        match self.get(name) {
            Some(Resolved::List(values)) => values.into_iter().map(Utf8PathBuf::from).collect(),
            Some(Resolved::Text(value)) => vec![Utf8PathBuf::from(value)],
            Some(_) => Vec::new(),
            None => {
                if self.flag(&format!("no-{name}")) {
                    Vec::new()
                } else {
                    candidates
                        .iter()
                        .filter(|candidate| candidate.exists())
                        .map(|candidate| (*candidate).to_owned())
                        .collect()
                }
            }
        }
    }

    /// Layer 1: explicit command-line values.
    ///
    /// `Option` fields answer "was the flag given"; repeatable flags count as
    /// given when at least one occurrence was parsed.
    fn from_cli(&self, name: &str) -> Option<Resolved> {
        let cli = self.cli;
        match name {
            "command" => string_list(&cli.command),
            "config-file" => cli.config_file.as_ref().map(path_text),
            "no-config-file" => cli.no_config_file.map(Resolved::Flag),
            "name" => cli.name.clone().map(Resolved::Text),
            "directory" => cli.directory.as_ref().map(path_text),
            "install-script" => path_list(&cli.install_script),
            "no-install-script" => cli.no_install_script.map(Resolved::Flag),
            "base-image" => cli.base_image.clone().map(Resolved::Text),
            "package" => string_list(&cli.package),
            "packages-file" => cli.packages_file.as_ref().map(path_text),
            "apt-sources-file" => cli.apt_sources_file.as_ref().map(path_text),
            "no-apt-sources-file" => cli.no_apt_sources_file.map(Resolved::Flag),
            "apt-keys" => cli.apt_keys.as_ref().map(path_text),
            "no-apt-keys" => cli.no_apt_keys.map(Resolved::Flag),
            "uid" => cli.uid.map(Resolved::Uint),
            "gid" => cli.gid.map(Resolved::Uint),
            "username" => cli.username.clone().map(Resolved::Text),
            "home-dir" => cli.home_dir.as_ref().map(path_text),
            "shell" => cli.shell.as_ref().map(path_text),
            "work-dir" => cli.work_dir.as_ref().map(path_text),
            "mount" => path_list(&cli.mount),
            "no-recursive-mount" => cli.no_recursive_mount.map(Resolved::Flag),
            "docker" => cli.docker.clone().map(Resolved::Text),
            "docker-host" => cli.docker_host.clone().map(Resolved::Text),
            "docker-run-flags" => cli.docker_run_flags.clone().map(Resolved::Text),
            "docker-passthrough" => cli.docker_passthrough.map(Resolved::Flag),
            "verbose" => (cli.verbose > 0).then(|| Resolved::Uint(u32::from(cli.verbose))),
            _ => None,
        }
    }

    /// Layer 2: the option's declared environment variable, if any.
    ///
    /// The raw string value is used as-is; an empty string still counts as
    /// set.
    fn from_env(&self, name: &str) -> Option<Resolved> {
        let (_, env_var) = OPTION_ENV_VARS.iter().find(|(option, _)| *option == name)?;
        self.env.string(env_var).map(Resolved::Text)
    }

    /// Layer 3: the active section of the config file.
    fn from_file(&self, name: &str) -> Option<Resolved> {
        self.file.get(name).map(|value| match value {
            ConfigValue::Text(text) => Resolved::Text(text.to_owned()),
            ConfigValue::Flag => Resolved::Flag(true),
        })
    }
}

/// A repeatable string flag counts as given when non-empty.
fn string_list(values: &[String]) -> Option<Resolved> {
    if values.is_empty() {
        None
    } else {
        Some(Resolved::List(values.to_vec()))
    }
}

/// A repeatable path flag counts as given when non-empty.
fn path_list(values: &[Utf8PathBuf]) -> Option<Resolved> {
    if values.is_empty() {
        None
    } else {
        Some(Resolved::List(
            values.iter().map(|path| path.to_string()).collect(),
        ))
    }
}

/// A path-valued flag resolves to its textual form.
fn path_text(path: &Utf8PathBuf) -> Resolved {
    Resolved::Text(path.to_string())
}
