//! Path resolution for storage locations.
//!
//! Resolves relative and tilde-prefixed paths to absolute paths. Unlike tree discovery,
//! the target does not need to exist yet: a database file may be created on first open.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a configured path.
///
/// Handles three cases:
/// - Tilde paths (`~/data`) - expanded to home directory
/// - Relative paths (`./blocks.db`) - resolved relative to `config_dir`
/// - Absolute paths - returned as-is
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Expands a tilde prefix to the home directory.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }

    if let Some(rest) = path.strip_prefix("~/") {
        let home = home_dir()?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_path("./blocks.db", Path::new("/work/project")).unwrap();
        assert_eq!(resolved, PathBuf::from("/work/project/./blocks.db"));
    }

    #[test]
    fn test_resolve_absolute_path() {
        let resolved = resolve_path("/var/lib/quarry.db", Path::new("/work")).unwrap();
        assert_eq!(resolved, PathBuf::from("/var/lib/quarry.db"));
    }

    #[test]
    fn test_resolve_tilde_path() {
        let Some(dirs) = BaseDirs::new() else {
            return;
        };
        let resolved = resolve_path("~/quarry/data", Path::new("/work")).unwrap();
        assert_eq!(resolved, dirs.home_dir().join("quarry/data"));
    }
}
