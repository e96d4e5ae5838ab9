//! Unit tests for ini document parsing and active-section lookup.

use camino::Utf8PathBuf;
use rstest::rstest;

use crate::config::tests::helpers::config_from;
use crate::config::{ConfigFile, ConfigValue};

#[rstest]
fn first_section_is_active() {
    let file = config_from(
        "[myproj]\nbase-image = ubuntu:22.04\n\n[other]\nbase-image = alpine:3.20\n",
    );

    assert_eq!(file.active_section_name(), Some("myproj"));
    assert_eq!(
        file.get("base-image"),
        Some(ConfigValue::Text("ubuntu:22.04"))
    );
}

#[rstest]
fn sections_beyond_the_first_are_never_consulted() {
    let file = config_from("[first]\n\n[second]\nshell = /bin/zsh\n");

    assert_eq!(file.get("shell"), None);
}

#[rstest]
fn bare_key_is_a_present_flag() {
    let file = config_from("[myproj]\ndocker-passthrough\n");

    assert_eq!(file.get("docker-passthrough"), Some(ConfigValue::Flag));
    assert_eq!(file.get("docker"), None);
}

#[rstest]
#[case("[s]\nkey = value\n", "value")]
#[case("[s]\nkey=value\n", "value")]
#[case("[s]\nkey : value\n", "value")]
#[case("[s]\nkey =   spaced out   \n", "spaced out")]
#[case("[s]\nkey =\n", "")]
fn entry_values_are_trimmed(#[case] text: &str, #[case] expected: &str) {
    let file = config_from(text);

    assert_eq!(file.get("key"), Some(ConfigValue::Text(expected)));
}

#[rstest]
fn duplicate_keys_resolve_to_the_last_occurrence() {
    let file = config_from("[s]\nkey = first\nkey = second\n");

    assert_eq!(file.get("key"), Some(ConfigValue::Text("second")));
}

#[rstest]
fn keys_match_case_sensitively() {
    let file = config_from("[s]\nBase-Image = ubuntu:22.04\n");

    assert_eq!(file.get("base-image"), None);
}

#[rstest]
#[case("# comment\n; another\n\n[s]\nkey = value\n")]
#[case("[s]\n# comment inside\nkey = value\n")]
fn comments_and_blank_lines_are_skipped(#[case] text: &str) {
    let file = config_from(text);

    assert_eq!(file.get("key"), Some(ConfigValue::Text("value")));
}

#[rstest]
#[case::entry_before_header("key = value\n[s]\n")]
#[case::unterminated_header("[s\nkey = value\n")]
#[case::empty_key("[s]\n= value\n")]
fn malformed_text_fails_to_parse(#[case] text: &str) {
    assert!(ConfigFile::parse(text).is_err());
}

#[rstest]
fn empty_document_has_zero_sections() {
    let file = config_from("");

    assert!(file.is_empty());
    assert_eq!(file.active_section_name(), None);
    assert_eq!(file.get("anything"), None);
}

#[rstest]
fn load_degrades_malformed_files_to_zero_sections() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = Utf8PathBuf::try_from(dir.path().join("build.cfg")).expect("UTF-8 path");
    std::fs::write(&path, "orphan-key = value\n[too-late]\n").expect("write config");

    let file = ConfigFile::load(&path);

    assert!(file.is_empty());
}

#[rstest]
fn load_degrades_missing_files_to_zero_sections() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = Utf8PathBuf::try_from(dir.path().join("absent.cfg")).expect("UTF-8 path");

    let file = ConfigFile::load(&path);

    assert!(file.is_empty());
}

#[rstest]
fn load_reads_wellformed_files() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = Utf8PathBuf::try_from(dir.path().join("build.cfg")).expect("UTF-8 path");
    std::fs::write(&path, "[myproj]\nbase-image = ubuntu:22.04\n").expect("write config");

    let file = ConfigFile::load(&path);

    assert_eq!(file.active_section_name(), Some("myproj"));
}
