use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Front-end configuration. The state machine takes none of this; the
/// admin list and storage location only matter at the chat boundary
/// and at bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub db_path: PathBuf,
    pub admin_ids: Vec<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("worktrack.sqlite3"),
            admin_ids: Vec::new(),
        }
    }
}

impl Config {
    /// Load from an optional JSON file, then apply environment
    /// overrides (`WORKTRACK_DB`, `WORKTRACK_ADMIN_IDS`). A malformed
    /// file is ignored with a warning rather than aborting startup.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed config {}: {err}", path.display());
                Self::default()
            })
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(db_path) = env::var("WORKTRACK_DB") {
            if !db_path.is_empty() {
                self.db_path = PathBuf::from(db_path);
            }
        }
        if let Ok(raw) = env::var("WORKTRACK_ADMIN_IDS") {
            self.admin_ids = parse_admin_ids(&raw);
        }
    }

    pub fn is_admin(&self, chat_id: i64) -> bool {
        self.admin_ids.contains(&chat_id)
    }
}

fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Ignoring non-numeric admin id '{part}'");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("does-not-exist.json")).unwrap();
        assert_eq!(config.db_path, PathBuf::from("worktrack.sqlite3"));
        assert!(config.admin_ids.is_empty());
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worktrack.json");
        fs::write(&path, r#"{"dbPath": "/tmp/wt.sqlite3", "adminIds": [7, 42]}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/wt.sqlite3"));
        assert!(config.is_admin(42));
        assert!(!config.is_admin(1));
    }

    #[test]
    fn admin_id_list_tolerates_junk() {
        assert_eq!(parse_admin_ids("1, 2,,abc, 3"), vec![1, 2, 3]);
        assert!(parse_admin_ids("").is_empty());
    }
}
