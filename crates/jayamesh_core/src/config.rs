//! Runtime configuration resolved from the environment.
//!
//! | variable             | default                                 |
//! |----------------------|-----------------------------------------|
//! | `JAYAMESH_DB_PATH`   | `<temp dir>/jayamesh.sqlite3`           |
//! | `JAYAMESH_LOG_LEVEL` | [`default_log_level`]                   |
//! | `JAYAMESH_LOG_DIR`   | `logs/` next to the database file       |
//!
//! Blank values count as unset. Relative paths are resolved against the
//! current directory so logging always receives an absolute directory.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "JAYAMESH_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "JAYAMESH_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "JAYAMESH_LOG_DIR";

const DB_FILE_NAME: &str = "jayamesh.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let db_path = value(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));
        let db_path = absolutize(&db_path);
        let log_dir = value(LOG_DIR_ENV)
            .map(|raw| absolutize(Path::new(&raw)))
            .unwrap_or_else(|| default_log_dir(&db_path));
        let log_level = value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string());

        Self {
            db_path,
            log_level,
            log_dir,
        }
    }

    /// Replaces the database path; the log directory follows unless it was
    /// set explicitly.
    pub fn with_db_path(mut self, db_path: impl AsRef<Path>) -> Self {
        let follows_db = self.log_dir == default_log_dir(&self.db_path);
        self.db_path = absolutize(db_path.as_ref());
        if follows_db {
            self.log_dir = default_log_dir(&self.db_path);
        }
        self
    }
}

fn default_log_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(|parent| parent.join(LOG_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_DIR_NAME))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => std::env::temp_dir().join(path),
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config(pairs: &[(&str, &str)]) -> CoreConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_live_in_temp_dir() {
        let config = config(&[]);
        assert_eq!(config.db_path, std::env::temp_dir().join("jayamesh.sqlite3"));
        assert_eq!(config.log_dir, std::env::temp_dir().join("logs"));
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn explicit_values_win_and_blank_is_unset() {
        let config = config(&[
            (DB_PATH_ENV, "/data/jm.sqlite3"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "   "),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/data/jm.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, PathBuf::from("/data/logs"));
    }

    #[test]
    fn relative_paths_become_absolute() {
        let config = config(&[(DB_PATH_ENV, "local.sqlite3")]);
        assert!(config.db_path.is_absolute());
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn overriding_db_moves_default_log_dir_only() {
        let moved = config(&[]).with_db_path("/srv/jm/store.sqlite3");
        assert_eq!(moved.log_dir, PathBuf::from("/srv/jm/logs"));

        let pinned = config(&[(LOG_DIR_ENV, "/var/log/jm")]).with_db_path("/srv/x.sqlite3");
        assert_eq!(pinned.log_dir, PathBuf::from("/var/log/jm"));
    }
}
