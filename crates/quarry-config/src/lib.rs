//! Configuration system for quarry.
//!
//! quarry uses TOML configuration files named `.quarry.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.quarry.toml` files found, then loading `~/.quarry.toml` as the global config with lowest
//! precedence.
//!
//! The resolved [`SearchConfig`] is an immutable value: the search engine receives it
//! explicitly on every call instead of reading process-wide state.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod resolve;
#[cfg(test)]
mod test_support;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawBlockTypes, RawConfig, RawSearchSettings, RawStoreSettings, parse_config_file,
    parse_config_str,
};
pub use resolve::resolve_path;
use serde::{Deserialize, Serialize};

/// Default maximum number of rows a search returns.
pub const DEFAULT_SEARCH_LIMIT: usize = 64;

/// Default maximum length of dynamic reference anchor text.
pub const DEFAULT_REF_TEXT_MAX_LEN: usize = 96;

/// Top-level merged configuration for quarry.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.quarry.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Search behavior shared by every query and replace call.
    pub search: SearchConfig,
    /// Locations of the block database and the document tree files.
    pub store: StoreSettings,
    /// Display names for boxes (notebooks), keyed by box ID.
    pub notebooks: BTreeMap<String, String>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.quarry.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same shape as a `.quarry.toml` file.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            search: self.search.clone(),
            store: self.store.clone(),
            notebooks: self.notebooks.clone(),
        };
        toml::to_string_pretty(&serializable).expect("settings serialization should not fail")
    }
}

/// Search settings.
///
/// Field selection (`name`, `alias`, `memo`, `ial`) controls which columns keyword and
/// regex searches look at; `content` and `tag` are always searched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum rows returned by a single search.
    pub limit: usize,
    /// Use the case-sensitive full-text table.
    pub case_sensitive: bool,
    /// Search block names.
    pub name: bool,
    /// Search block aliases.
    pub alias: bool,
    /// Search block memos.
    pub memo: bool,
    /// Search custom attributes (the serialized IAL).
    pub ial: bool,
    /// Maximum length of reference anchor text shown for ref-search candidates.
    pub ref_text_max_len: usize,
    /// Block kinds included when the caller does not pick types explicitly.
    pub types: BlockTypes,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            case_sensitive: false,
            name: true,
            alias: true,
            memo: true,
            ial: false,
            ref_text_max_len: DEFAULT_REF_TEXT_MAX_LEN,
            types: BlockTypes::default(),
        }
    }
}

/// Per-kind inclusion flags for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockTypes {
    /// Documents.
    pub document: bool,
    /// Headings.
    pub heading: bool,
    /// Lists.
    pub list: bool,
    /// List items.
    pub list_item: bool,
    /// Code blocks.
    pub code_block: bool,
    /// Math blocks.
    pub math_block: bool,
    /// Tables.
    pub table: bool,
    /// Blockquotes.
    pub blockquote: bool,
    /// Super blocks.
    pub super_block: bool,
    /// Paragraphs.
    pub paragraph: bool,
    /// Raw HTML blocks.
    pub html_block: bool,
    /// Query embed blocks.
    pub embed_block: bool,
}

impl Default for BlockTypes {
    fn default() -> Self {
        Self {
            document: true,
            heading: true,
            list: false,
            list_item: false,
            code_block: true,
            math_block: true,
            table: true,
            blockquote: false,
            super_block: false,
            paragraph: true,
            html_block: true,
            embed_block: false,
        }
    }
}

impl BlockTypes {
    /// Returns flags with every kind enabled.
    pub fn all() -> Self {
        Self {
            document: true,
            heading: true,
            list: true,
            list_item: true,
            code_block: true,
            math_block: true,
            table: true,
            blockquote: true,
            super_block: true,
            paragraph: true,
            html_block: true,
            embed_block: true,
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite block database.
    pub database: Option<PathBuf>,
    /// Directory holding persisted document trees.
    pub trees: Option<PathBuf>,
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// Search settings.
    search: SearchConfig,
    /// Storage locations.
    store: StoreSettings,
    /// Box display names (sorted for deterministic output).
    notebooks: BTreeMap<String, String>,
}
