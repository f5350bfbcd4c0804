//! Configuration file parsing.
//!
//! Parses individual `.quarry.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Search settings section.
    pub search: Option<RawSearchSettings>,
    /// Storage locations section.
    pub store: Option<RawStoreSettings>,
    /// Box display names: box ID -> name.
    pub notebooks: Option<HashMap<String, String>>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Maximum rows per search.
    pub limit: Option<usize>,
    /// Case-sensitive full-text matching.
    pub case_sensitive: Option<bool>,
    /// Search names.
    pub name: Option<bool>,
    /// Search aliases.
    pub alias: Option<bool>,
    /// Search memos.
    pub memo: Option<bool>,
    /// Search custom attributes.
    pub ial: Option<bool>,
    /// Maximum reference anchor text length.
    pub ref_text_max_len: Option<usize>,
    /// Per-kind inclusion flags.
    pub types: Option<RawBlockTypes>,
}

/// Raw per-kind inclusion flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBlockTypes {
    /// Documents.
    pub document: Option<bool>,
    /// Headings.
    pub heading: Option<bool>,
    /// Lists.
    pub list: Option<bool>,
    /// List items.
    pub list_item: Option<bool>,
    /// Code blocks.
    pub code_block: Option<bool>,
    /// Math blocks.
    pub math_block: Option<bool>,
    /// Tables.
    pub table: Option<bool>,
    /// Blockquotes.
    pub blockquote: Option<bool>,
    /// Super blocks.
    pub super_block: Option<bool>,
    /// Paragraphs.
    pub paragraph: Option<bool>,
    /// HTML blocks.
    pub html_block: Option<bool>,
    /// Query embed blocks.
    pub embed_block: Option<bool>,
}

/// Raw storage locations. Relative paths resolve against the config file's directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStoreSettings {
    /// Block database path.
    pub database: Option<String>,
    /// Tree directory path.
    pub trees: Option<String>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
