//! Configuration system for container-build.
//!
//! Options merge from four layers with deterministic precedence: explicit
//! command-line arguments beat environment variables (for the few options
//! that declare one), which beat the active section of an ini-style config
//! file, which beats the built-in defaults. Some defaults are existence-gated
//! paths, suppressible with `--no-X` negation flags.
//!
//! # Example config file
//!
//! ```ini
//! [myproj]
//! base-image = ubuntu:22.04
//! packages-file = ci/packages
//! docker-passthrough
//! ```
//!
//! Only the first section is consulted; `docker-passthrough` above is a bare
//! key acting as a present-flag.

mod cli;
pub mod defaults;
mod file;
mod loader;
mod resolver;
mod types;

#[cfg(test)]
mod tests;

pub use cli::Cli;
pub(crate) use file::read_ambient;
pub use file::{ConfigFile, ConfigValue};
pub use loader::load_effective;
pub use resolver::{Resolved, Resolver};
pub use types::EffectiveConfig;
