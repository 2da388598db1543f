//! Application configuration
//!
//! Settings come from three layers, later ones winning: built-in
//! defaults, the TOML config file, and `BIBLIO_*` environment
//! variables. The data directory holds the durable client state: the
//! session token and the serialized display preferences.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Token file name inside the data directory
const TOKEN_FILE: &str = "token";

/// Preferences file name inside the data directory
const PREFERENCES_FILE: &str = "preferences.json";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Bibliotheque API server
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where the token and preferences live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file for TUI mode; unset means {data_dir}/debug.log
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: default_data_dir(),
            log_file: None,
        }
    }
}

/// Read a `BIBLIO_`-prefixed environment variable
fn read_env(suffix: &str) -> Option<String> {
    std::env::var(format!("BIBLIO_{}", suffix)).ok()
}

impl Config {
    /// Load from the default config file location
    ///
    /// Precedence, highest first: `BIBLIO_API_URL` / `BIBLIO_DATA_DIR` /
    /// `BIBLIO_LOG_FILE`, then the config file (its path itself
    /// overridable with `BIBLIO_CONFIG`), then defaults.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from a specific config file, then apply env overrides
    ///
    /// A missing file is not an error; defaults are used. The data
    /// directory is created here so later writes cannot race its absence.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", config.data_dir))?;
        Ok(config)
    }

    /// Parse a TOML string, then apply env overrides (test helper)
    pub fn load_from_str(raw: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(raw).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        // An empty BIBLIO_API_URL keeps the configured value
        if let Some(url) = read_env("API_URL").filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(dir) = read_env("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        // An empty BIBLIO_LOG_FILE clears the setting
        if let Some(path) = read_env("LOG_FILE") {
            self.log_file = (!path.is_empty()).then(|| PathBuf::from(path));
        }
    }

    /// Write the current settings to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Write the current settings as pretty TOML
    pub fn save_to_path(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        let rendered = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Path of the config file, honouring `BIBLIO_CONFIG`
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = read_env("CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("biblio")
            .join("config.toml")
    }

    /// Where the bearer token is persisted across restarts
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }

    /// Where the display preferences are persisted
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biblio")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    // Environment variables are process-global; these tests take turns.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "BIBLIO_API_URL",
        "BIBLIO_DATA_DIR",
        "BIBLIO_LOG_FILE",
        "BIBLIO_CONFIG",
    ];

    /// Holds the env lock and puts the variables back on drop
    struct EnvGuard<'a> {
        _lock: MutexGuard<'a, ()>,
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard<'_> {
        fn clean() -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = ENV_VARS
                .iter()
                .map(|&name| {
                    let old = env::var(name).ok();
                    env::remove_var(name);
                    (name, old)
                })
                .collect();
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, old) in &self.saved {
                match old {
                    Some(value) => env::set_var(name, value),
                    None => env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = EnvGuard::clean();

        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(config.data_dir.ends_with("biblio"));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_durable_storage_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/biblio"),
            ..Config::default()
        };

        assert_eq!(config.token_path(), PathBuf::from("/data/biblio/token"));
        assert_eq!(
            config.preferences_path(),
            PathBuf::from("/data/biblio/preferences.json")
        );
    }

    #[test]
    fn test_api_url_override() {
        let _guard = EnvGuard::clean();
        let mut config = Config::default();

        env::set_var("BIBLIO_API_URL", "http://books.example.com:9000");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "http://books.example.com:9000");

        // Empty override is ignored rather than blanking the URL
        env::set_var("BIBLIO_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "http://books.example.com:9000");
    }

    #[test]
    fn test_data_dir_override() {
        let _guard = EnvGuard::clean();
        let mut config = Config::default();

        env::set_var("BIBLIO_DATA_DIR", "/tmp/biblio-test");
        config.apply_env_overrides();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/biblio-test"));
    }

    #[test]
    fn test_log_file_override_and_clear() {
        let _guard = EnvGuard::clean();
        let mut config = Config::default();

        env::set_var("BIBLIO_LOG_FILE", "/tmp/biblio.log");
        config.apply_env_overrides();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/biblio.log")));

        env::set_var("BIBLIO_LOG_FILE", "");
        config.apply_env_overrides();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_config_path_override() {
        let _guard = EnvGuard::clean();

        env::set_var("BIBLIO_CONFIG", "/elsewhere/biblio.toml");
        assert_eq!(
            Config::config_file_path(),
            PathBuf::from("/elsewhere/biblio.toml")
        );
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::clean();

        let config = Config::load_from_str(
            r#"
            api_url = "http://localhost:8123"
            data_dir = "/custom/data"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8123");
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let _guard = EnvGuard::clean();

        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("BIBLIO_DATA_DIR", temp_dir.path().join("data"));

        let config = Config::load_from_path(&PathBuf::from("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        // Loading created the data directory
        assert!(temp_dir.path().join("data").exists());
    }

    #[test]
    fn test_save_round_trip() {
        let _guard = EnvGuard::clean();

        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        env::set_var("BIBLIO_DATA_DIR", temp_dir.path().join("data"));

        let config = Config {
            api_url: "http://localhost:9999".to_string(),
            data_dir: temp_dir.path().join("data"),
            log_file: Some(temp_dir.path().join("biblio.log")),
        };
        config.save_to_path(&config_path).unwrap();

        let reloaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(reloaded.api_url, "http://localhost:9999");
        assert_eq!(reloaded.log_file, config.log_file);
    }
}
