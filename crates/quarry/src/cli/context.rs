//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use quarry_config::Config;
use quarry_search::{BlockStore, FileTreeStore};

use super::args::StoreArgs;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration, then applies storage overrides.
    pub fn load(overrides: &StoreArgs) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let mut config = load_config_or_failure(&cwd)?;
        if let Some(database) = &overrides.database {
            config.store.database = Some(cwd.join(database));
        }
        if let Some(trees) = &overrides.trees {
            config.store.trees = Some(cwd.join(trees));
        }
        Ok(Self { cwd, config })
    }

    /// Opens the configured block database.
    pub fn open_store(&self) -> Result<BlockStore, ExitCode> {
        let Some(path) = &self.config.store.database else {
            eprintln!("error: no block database configured");
            eprintln!("Set [store] database in .quarry.toml or pass --database.");
            return Err(ExitCode::FAILURE);
        };
        BlockStore::open(path).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Returns the tree store over the configured tree directory.
    pub fn tree_store(&self) -> Result<FileTreeStore, ExitCode> {
        let Some(dir) = &self.config.store.trees else {
            eprintln!("error: no tree directory configured");
            eprintln!("Set [store] trees in .quarry.toml or pass --trees.");
            return Err(ExitCode::FAILURE);
        };
        Ok(FileTreeStore::new(dir))
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
