//! Configuration loading with layered precedence.
//!
//! The config file path itself resolves by the same rule as any other
//! option: an explicit `--config-file` path wins; otherwise the default path
//! is used only if it exists on disk and `--no-config-file` was not given.
//! The chosen file is loaded once, degrading malformed or unreadable content
//! to a document with zero sections, and every option is then resolved into
//! an immutable [`EffectiveConfig`].

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::Result;

use super::cli::Cli;
use super::defaults;
use super::file::ConfigFile;
use super::types::EffectiveConfig;

/// Load configuration with full layer precedence.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a typed option resolves to an
/// unparseable value. A missing or malformed config file is not an error.
pub fn load_effective<E: mockable::Env>(cli: &Cli, env: &E) -> Result<EffectiveConfig> {
    let config_path = resolve_config_path(cli);
    let file = config_path
        .as_deref()
        .map(ConfigFile::load)
        .unwrap_or_default();
    EffectiveConfig::resolve(cli, &file, env, config_path)
}

/// Pick the config file path: explicit flag, else the default when it exists
/// and is not suppressed.
fn resolve_config_path(cli: &Cli) -> Option<Utf8PathBuf> {
    if let Some(path) = &cli.config_file {
        return Some(path.clone());
    }
    if cli.no_config_file.unwrap_or(false) {
        return None;
    }
    let default = Utf8Path::new(defaults::DEFAULT_CONFIG_FILE);
    default.exists().then(|| default.to_owned())
}
