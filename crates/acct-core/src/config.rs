use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AcctError, Result};

// ── DatabaseConfig ─────────────────────────────────────────────────────────────

/// Connection parameters for the user-administration database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    /// Placeholder values written into a freshly scaffolded config file.
    fn default() -> Self {
        Self {
            username: "placeholder".to_string(),
            password: "placeholder".to_string(),
            host: "database1".to_string(),
            database: "hb_useradmin".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Build the MySQL connection URL for sqlx.
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}/{}",
            self.username, self.password, self.host, self.database
        )
    }
}

// ── Config ─────────────────────────────────────────────────────────────────────

/// The on-disk config file. Currently a single `database` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    pub database: DatabaseConfig,
}

impl Config {
    /// Load the config file at `path`.
    ///
    /// When the file does not exist, a skeleton with placeholder values is
    /// written there and a fatal [`AcctError::Config`] is returned telling
    /// the operator to fill in the credentials. A path pointing at a
    /// directory is also rejected.
    pub fn load_or_scaffold(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(AcctError::Config(format!(
                "config path '{}' points to a directory",
                path.display()
            )));
        }

        if !path.exists() {
            Config::default().save_to(path)?;
            return Err(AcctError::Config(format!(
                "config file has been created at '{}'. \
                 Provide database (user) credentials in it and run again",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|source| AcctError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| {
            AcctError::Config(format!(
                "config file '{}' does not contain the required data: {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Atomically write the config to `path`, creating parent directories
    /// if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        tmp.path().join("config.json")
    }

    #[test]
    fn test_missing_file_scaffolds_skeleton_and_errors() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let result = Config::load_or_scaffold(&path);
        assert!(result.is_err(), "first run must abort");
        assert!(path.exists(), "skeleton file must be created");

        // The skeleton holds the placeholder values.
        let written: Config =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.database.username, "placeholder");
        assert_eq!(written.database.database, "hb_useradmin");
    }

    #[test]
    fn test_load_round_trip() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let config = Config {
            database: DatabaseConfig {
                username: "reporter".to_string(),
                password: "s3cret".to_string(),
                host: "db.example.org".to_string(),
                database: "useradmin".to_string(),
            },
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_or_scaffold(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_directory_path_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        let result = Config::load_or_scaffold(tmp.path());
        let err = result.expect_err("directory must be rejected");
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        std::fs::write(&path, "{\"database\": {}}").unwrap();

        let err = Config::load_or_scaffold(&path).expect_err("incomplete config must fail");
        assert!(err.to_string().contains("required data"));
    }

    #[test]
    fn test_database_url() {
        let db = DatabaseConfig {
            username: "u".to_string(),
            password: "p".to_string(),
            host: "h".to_string(),
            database: "d".to_string(),
        };
        assert_eq!(db.url(), "mysql://u:p@h/d");
    }
}
