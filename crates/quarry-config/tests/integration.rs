//! Integration tests for quarry-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> resolve -> merge.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use quarry_config::{Config, ConfigError};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    /// Owned temporary directory.
    root: tempfile::TempDir,
}

impl TestEnv {
    /// Creates an empty environment.
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    /// Returns the environment root.
    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_root_config_only() {
    let env = TestEnv::new();
    env.create_file(
        ".quarry.toml",
        r#"
root = true

[search]
limit = 10
case_sensitive = true

[store]
database = "blocks.db"
"#,
    );

    let config = Config::load(env.path()).unwrap();

    assert_eq!(config.search.limit, 10);
    assert!(config.search.case_sensitive);
    assert!(config.search.name);
    assert_eq!(config.store.database, Some(env.path().join("blocks.db")));
    assert_eq!(config.config_root.as_deref(), Some(env.path()));
}

#[test]
fn test_nested_configs_merge_by_precedence() {
    let env = TestEnv::new();
    env.create_file(
        ".quarry.toml",
        r#"
root = true

[search]
limit = 99
ial = true

[search.types]
list = true

[notebooks]
"20210808180117-czj9bvb" = "Outer"
"20210808180117-aaaaaaa" = "Shared"
"#,
    );
    env.create_file(
        "notes/.quarry.toml",
        r#"
[search]
limit = 5

[notebooks]
"20210808180117-czj9bvb" = "Inner"
"#,
    );
    let cwd = env.create_dir("notes/daily");

    let config = Config::load(&cwd).unwrap();

    assert_eq!(config.search.limit, 5);
    assert!(config.search.ial);
    assert!(config.search.types.list);
    assert_eq!(config.notebooks["20210808180117-czj9bvb"], "Inner");
    assert_eq!(config.notebooks["20210808180117-aaaaaaa"], "Shared");
    assert_eq!(config.config_root, Some(env.path().join("notes")));
}

#[test]
fn test_load_from_explicit_files() {
    let env = TestEnv::new();
    let file = env.create_file("custom/.quarry.toml", "[store]\ntrees = \"data\"\n");

    let config = Config::load_from_files(&[file]).unwrap();

    assert_eq!(config.store.trees, Some(env.path().join("custom/data")));
}

#[test]
fn test_load_from_no_files_is_default() {
    let config = Config::load_from_files(&[]).unwrap();
    assert_eq!(config.search, quarry_config::SearchConfig::default());
}

#[test]
fn test_invalid_config_reports_path() {
    let env = TestEnv::new();
    let file = env.create_file(".quarry.toml", "root = true\n[search\n");

    let err = Config::load(env.path()).unwrap_err();
    match err {
        ConfigError::ParseToml { path, .. } => assert_eq!(path, file),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_settings_roundtrip_through_toml() {
    let env = TestEnv::new();
    env.create_file(
        ".quarry.toml",
        "root = true\n[search]\nlimit = 7\nmemo = false\n",
    );
    let config = Config::load(env.path()).unwrap();

    let dumped = config.settings_to_toml();
    let reparsed = quarry_config::parse_config_str(&dumped, Path::new("dump")).unwrap();
    let search = reparsed.search.unwrap();
    assert_eq!(search.limit, Some(7));
    assert_eq!(search.memo, Some(false));
}
