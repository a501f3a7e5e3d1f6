//! Client configuration.
//!
//! Reads `~/.taskboard/config.toml`. Every key is optional; command-line
//! flags override the file, and built-in defaults fill the rest.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:7071";
pub const DEFAULT_ORGANIZATION: &str = "demo-org";

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Backend URL (e.g. "http://localhost:7071").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Organization new tasks are filed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    /// Where the TUI writes its log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    /// Load config from disk, or return the default if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}

/// Settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub organization_id: String,
    pub log_file: PathBuf,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub organization_id: Option<String>,
}

impl Settings {
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Self {
        Settings {
            base_url: overrides
                .base_url
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            organization_id: overrides
                .organization_id
                .or(file.organization_id)
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            log_file: file.log_file.unwrap_or_else(|| config_dir().join("taskboard.log")),
        }
    }
}

/// Default config file path: ~/.taskboard/config.toml.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Return the taskboard directory (~/.taskboard).
fn config_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = ConfigFile::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base-url = \"http://tasks.internal:8080\"\norganization-id = \"acme\"\nlog-file = \"/tmp/tb.log\"\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://tasks.internal:8080"));
        assert_eq!(config.organization_id.as_deref(), Some("acme"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/tb.log")));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [").unwrap();
        assert!(ConfigFile::load(&path).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let file = ConfigFile {
            base_url: Some("http://file".into()),
            organization_id: Some("file-org".into()),
            log_file: None,
        };
        let settings = Settings::resolve(
            file,
            Overrides { base_url: Some("http://flag".into()), organization_id: None },
        );
        assert_eq!(settings.base_url, "http://flag");
        assert_eq!(settings.organization_id, "file-org");
        assert!(settings.log_file.ends_with("taskboard.log"));

        let defaults = Settings::resolve(ConfigFile::default(), Overrides::default());
        assert_eq!(defaults.base_url, DEFAULT_BASE_URL);
        assert_eq!(defaults.organization_id, DEFAULT_ORGANIZATION);
    }
}
