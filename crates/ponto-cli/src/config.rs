//! Configuration loading and management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ponto_store::StaleStorePolicy;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the record store (CSV).
    pub store_path: PathBuf,

    /// What to do when the record store has an unexpected header.
    pub stale_store: StaleStorePolicy,

    /// Prefix of chat commands (e.g. `/` in `/ponto`).
    pub command_prefix: String,

    /// Command names that start a session.
    pub start_aliases: Vec<String>,

    /// Guild display names (nicknames) by user id.
    pub nicknames: BTreeMap<String, String>,

    /// Global usernames by user id.
    pub usernames: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            store_path: data_dir.join("records.csv"),
            stale_store: StaleStorePolicy::default(),
            command_prefix: "/".to_string(),
            start_aliases: [
                "ponto",
                "entrar",
                "qap",
                "trabalhar",
                "lida",
                "clt",
                "nãoquerotrabalhar",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            nicknames: BTreeMap::new(),
            usernames: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PONTO_*)
        figment = figment.merge(Env::prefixed("PONTO_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for ponto.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ponto"))
}

/// Returns the platform-specific data directory for ponto.
///
/// On Linux: `~/.local/share/ponto`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ponto"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_ponto() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "ponto");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_store() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.store_path, data_dir.join("records.csv"));
        assert_eq!(config.stale_store, StaleStorePolicy::Backup);
        assert!(config.start_aliases.iter().any(|a| a == "ponto"));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ponto.toml");
        std::fs::write(
            &path,
            r#"
store_path = "/srv/ponto/records.csv"
stale_store = "fail"
start_aliases = ["clock-in"]

[nicknames]
"42" = "Ana (RH)"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.store_path, PathBuf::from("/srv/ponto/records.csv"));
        assert_eq!(config.stale_store, StaleStorePolicy::Fail);
        assert_eq!(config.start_aliases, vec!["clock-in"]);
        assert_eq!(config.nicknames.get("42").map(String::as_str), Some("Ana (RH)"));
        assert_eq!(config.command_prefix, "/");
    }
}
