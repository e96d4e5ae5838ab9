//! Shared fixtures and helper constructors for config tests.

use clap::Parser;
use mockable::MockEnv;
use rstest::fixture;

use crate::config::{Cli, ConfigFile};

/// Parse a command line, prepending the program name.
pub fn cli_from(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("container-build").chain(args.iter().copied()))
}

/// Parse ini text into a document, failing the test on malformed input.
pub fn config_from(text: &str) -> ConfigFile {
    ConfigFile::parse(text).expect("ini text should parse")
}

/// Fixture providing a `MockEnv` that returns `None` for all environment
/// variable queries.
#[fixture]
pub fn empty_env() -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(|_| None);
    env
}

/// Build a `MockEnv` serving the given variables and `None` for the rest.
pub fn env_with(vars: &[(&str, &str)]) -> MockEnv {
    let owned: Vec<(String, String)> = vars
        .iter()
        .map(|(key, value)| (String::from(*key), String::from(*value)))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string().returning(move |key| {
        owned
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.clone())
    });
    env
}
