//! The ini-style config file.
//!
//! The file format is deliberately small: `[section]` headers, `key = value`
//! entries (`:` is also accepted as a delimiter), bare keys acting as
//! present-flags, and `#`/`;` comments. Keys map 1:1 to long-form option
//! names and are matched case-sensitively. Only the first section of the
//! document is ever consulted; its name is exposed through
//! [`ConfigFile::active_section_name`].
//!
//! A missing, unreadable, or malformed file is not an error: [`ConfigFile::load`]
//! degrades to a document with zero sections and resolution proceeds on the
//! remaining layers.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::ConfigError;

/// A loaded ini document.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    sections: Vec<Section>,
}

/// One `[name]` section with its entries in document order.
#[derive(Debug, Clone)]
struct Section {
    name: String,
    entries: Vec<(String, Option<String>)>,
}

/// A value looked up in the active section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValue<'a> {
    /// A `key = value` entry.
    Text(&'a str),
    /// A bare key with no value, acting as a present-flag.
    Flag,
}

impl ConfigFile {
    /// Parse ini text into a document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for an unterminated section header,
    /// an entry with an empty key, or an entry appearing before any section
    /// header. Callers that want the degrade-to-empty behaviour use
    /// [`ConfigFile::load`] instead.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut sections: Vec<Section> = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| ConfigError::ParseError {
                    message: format!("unterminated section header '{line}'"),
                })?;
                sections.push(Section {
                    name: name.trim().to_owned(),
                    entries: Vec::new(),
                });
                continue;
            }

            let Some(section) = sections.last_mut() else {
                return Err(ConfigError::ParseError {
                    message: format!("entry '{line}' appears before any section header"),
                });
            };

            let (key, value) = split_entry(line);
            if key.is_empty() {
                return Err(ConfigError::ParseError {
                    message: format!("entry '{line}' has an empty key"),
                });
            }
            section.entries.push((key.to_owned(), value.map(str::to_owned)));
        }

        Ok(Self { sections })
    }

    /// Load a config file from disk, degrading every failure to an empty
    /// document.
    #[must_use]
    pub fn load(path: &Utf8Path) -> Self {
        read_ambient(path)
            .ok()
            .and_then(|text| Self::parse(&text).ok())
            .unwrap_or_default()
    }

    /// The name of the active section: the first in the document, if any.
    #[must_use]
    pub fn active_section_name(&self) -> Option<&str> {
        self.sections.first().map(|section| section.name.as_str())
    }

    /// Look up a key in the active section.
    ///
    /// A duplicated key resolves to its last occurrence. Sections beyond the
    /// first are never consulted.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ConfigValue<'_>> {
        let section = self.sections.first()?;
        section
            .entries
            .iter()
            .rev()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| match value {
                Some(text) => ConfigValue::Text(text),
                None => ConfigValue::Flag,
            })
    }

    /// Whether the document has zero sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Split an entry line into key and optional value at the first `=` or `:`.
fn split_entry(line: &str) -> (&str, Option<&str>) {
    match line.find(['=', ':']) {
        Some(index) => {
            let (key, rest) = line.split_at(index);
            let value = rest.get(1..).unwrap_or("");
            (key.trim_end(), Some(value.trim_start()))
        }
        None => (line, None),
    }
}

/// Read a file relative to the ambient filesystem.
///
/// Opens the parent directory with ambient authority and reads the file from
/// there, per project conventions for capability-oriented filesystem access.
pub(crate) fn read_ambient(path: &Utf8Path) -> std::io::Result<String> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::other(format!("path '{path}' has no file name"))
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
