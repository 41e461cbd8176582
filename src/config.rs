use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

const MIN_FEEDBACK_MS: u64 = 250;
const MAX_FEEDBACK_MS: u64 = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_document_dir")]
    pub document_dir: String,
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_document_dir() -> String {
    dirs::document_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keybasket")
        .to_string_lossy()
        .to_string()
}
fn default_feedback_ms() -> u64 {
    1500
}
fn default_log_filter() -> String {
    "keybasket=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            document_dir: default_document_dir(),
            feedback_ms: default_feedback_ms(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keybasket")
            .join("config.toml")
    }

    /// Clamp out-of-range values and restore blanked ones. Call after
    /// deserialization and after applying command-line overrides.
    pub fn validate(&mut self) {
        self.feedback_ms = self.feedback_ms.clamp(MIN_FEEDBACK_MS, MAX_FEEDBACK_MS);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
        if self.document_dir.trim().is_empty() {
            self.document_dir = default_document_dir();
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
    }

    pub fn feedback_ttl(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    /// `document_dir` with a leading `~` expanded.
    pub fn document_path(&self) -> PathBuf {
        expand_home(&self.document_dir)
    }
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~')
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest.trim_start_matches(['/', '\\']));
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.feedback_ms, 1500);
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(config.document_dir.contains("keybasket"));
        assert_eq!(config.log_filter, "keybasket=info");
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "gruvbox-dark"
feedback_ms = 900
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "gruvbox-dark");
        assert_eq!(config.feedback_ms, 900);
        assert_eq!(config.log_filter, "keybasket=info");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.document_dir, deserialized.document_dir);
        assert_eq!(config.feedback_ms, deserialized.feedback_ms);
    }

    #[test]
    fn test_validate_clamps_feedback_and_restores_blanks() {
        let mut config = Config::default();
        config.feedback_ms = 5;
        config.theme = "  ".to_string();
        config.document_dir = String::new();
        config.validate();
        assert_eq!(config.feedback_ms, 250);
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(!config.document_dir.is_empty());

        config.feedback_ms = 60_000;
        config.validate();
        assert_eq!(config.feedback_ms, 10_000);
    }

    #[test]
    fn test_feedback_ttl_matches_ms() {
        let config = Config::default();
        assert_eq!(config.feedback_ttl(), Duration::from_millis(1500));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/docs"), PathBuf::from("/tmp/docs"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/notes"), home.join("notes"));
        }
    }
}
