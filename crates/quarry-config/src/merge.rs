//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving paths.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    BlockTypes, Config, ConfigError, SearchConfig, StoreSettings,
    parse::{RawBlockTypes, RawConfig, RawSearchSettings},
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to
/// CWD), lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Store paths: first defined value wins, resolved against its own config file
/// - Notebook names: merged by box ID, first definition wins
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let search = merge_search_settings(configs);
    let store = merge_store_settings(configs)?;
    let notebooks = merge_notebooks(configs);
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    Ok(Config {
        search,
        store,
        notebooks,
        config_root,
    })
}

/// Merges search settings.
fn merge_search_settings(configs: &[ParsedConfig]) -> SearchConfig {
    let mut result = SearchConfig::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref search) = parsed.config.search {
            apply_raw_search(&mut result, search);
        }
    }

    result
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchConfig, raw: &RawSearchSettings) {
    if let Some(v) = raw.limit {
        result.limit = v;
    }
    if let Some(v) = raw.case_sensitive {
        result.case_sensitive = v;
    }
    if let Some(v) = raw.name {
        result.name = v;
    }
    if let Some(v) = raw.alias {
        result.alias = v;
    }
    if let Some(v) = raw.memo {
        result.memo = v;
    }
    if let Some(v) = raw.ial {
        result.ial = v;
    }
    if let Some(v) = raw.ref_text_max_len {
        result.ref_text_max_len = v;
    }
    if let Some(ref types) = raw.types {
        apply_raw_types(&mut result.types, types);
    }
}

/// Applies raw per-kind flags.
fn apply_raw_types(result: &mut BlockTypes, raw: &RawBlockTypes) {
    let pairs = [
        (&mut result.document, raw.document),
        (&mut result.heading, raw.heading),
        (&mut result.list, raw.list),
        (&mut result.list_item, raw.list_item),
        (&mut result.code_block, raw.code_block),
        (&mut result.math_block, raw.math_block),
        (&mut result.table, raw.table),
        (&mut result.blockquote, raw.blockquote),
        (&mut result.super_block, raw.super_block),
        (&mut result.paragraph, raw.paragraph),
        (&mut result.html_block, raw.html_block),
        (&mut result.embed_block, raw.embed_block),
    ];
    for (flag, value) in pairs {
        if let Some(v) = value {
            *flag = v;
        }
    }
}

/// Merges storage locations, resolving each against the file that defined it.
fn merge_store_settings(configs: &[ParsedConfig]) -> Result<StoreSettings, ConfigError> {
    let mut result = StoreSettings::default();

    for parsed in configs.iter().rev() {
        let Some(ref store) = parsed.config.store else {
            continue;
        };
        let config_dir = parsed
            .path
            .parent()
            .ok_or_else(|| ConfigError::NoParentDirectory {
                path: parsed.path.clone(),
            })?;

        if let Some(ref database) = store.database {
            result.database = Some(resolve_path(database, config_dir)?);
        }
        if let Some(ref trees) = store.trees {
            result.trees = Some(resolve_path(trees, config_dir)?);
        }
    }

    Ok(result)
}

/// Merges notebook display names; the first definition of a box ID wins.
fn merge_notebooks(configs: &[ParsedConfig]) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for parsed in configs {
        let Some(ref notebooks) = parsed.config.notebooks else {
            continue;
        };
        for (id, name) in notebooks {
            result.entry(id.clone()).or_insert_with(|| name.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_config_str;

    /// Builds a parsed config located at `dir/.quarry.toml`.
    fn parsed(dir: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: Path::new(dir).join(".quarry.toml"),
            config: parse_config_str(toml, Path::new("test")).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]).unwrap();
        assert_eq!(result.search.limit, 64);
        assert!(result.notebooks.is_empty());
    }

    #[test]
    fn test_merge_scalar_override() {
        let local = parsed("/home/u/project", "[search]\nlimit = 10\n");
        let global = parsed("/home/u", "[search]\nlimit = 99\ncase_sensitive = true\n");

        let result = merge_configs(&[local, global]).unwrap();
        assert_eq!(result.search.limit, 10);
        assert!(result.search.case_sensitive);
        assert_eq!(result.config_root, Some(PathBuf::from("/home/u/project")));
    }

    #[test]
    fn test_merge_type_flags_individually() {
        let local = parsed("/p", "[search.types]\nlist = true\n");
        let global = parsed("/", "[search.types]\nlist = false\nparagraph = false\n");

        let result = merge_configs(&[local, global]).unwrap();
        assert!(result.search.types.list);
        assert!(!result.search.types.paragraph);
        assert!(result.search.types.heading);
    }

    #[test]
    fn test_merge_store_paths_resolve_per_file() {
        let local = parsed("/p", "[store]\ndatabase = \"blocks.db\"\n");
        let global = parsed("/g", "[store]\ndatabase = \"other.db\"\ntrees = \"data\"\n");

        let result = merge_configs(&[local, global]).unwrap();
        assert_eq!(result.store.database, Some(PathBuf::from("/p/blocks.db")));
        assert_eq!(result.store.trees, Some(PathBuf::from("/g/data")));
    }

    #[test]
    fn test_merge_notebooks_first_wins() {
        let local = parsed("/p", "[notebooks]\nbox1 = \"Local\"\n");
        let global = parsed("/g", "[notebooks]\nbox1 = \"Global\"\nbox2 = \"Other\"\n");

        let result = merge_configs(&[local, global]).unwrap();
        assert_eq!(result.notebooks["box1"], "Local");
        assert_eq!(result.notebooks["box2"], "Other");
    }
}
