use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CounselError, Result};

/// Top-level configuration for the Counsel assistant.
///
/// Loaded from `~/.counsel/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounselConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl CounselConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CounselConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CounselError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.counsel/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second accepted on the chat endpoint.
    pub rate_limit_per_sec: u64,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3040,
            rate_limit_per_sec: 50,
            cors_origins: Vec::new(),
        }
    }
}

/// Assistant behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub enabled: bool,
    /// Maximum utterance length in characters.
    pub max_message_length: usize,
    /// Minimum cosine similarity for a document to be cited.
    pub similarity_threshold: f32,
    /// Maximum number of documents cited per answer.
    pub max_documents: usize,
    /// Maximum characters quoted from each document.
    pub snippet_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 2000,
            similarity_threshold: 0.1,
            max_documents: 5,
            snippet_chars: 350,
        }
    }
}

/// Session store bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum live sessions before the least recently used is evicted.
    pub capacity: usize,
    /// Idle minutes after which a session is forgotten.
    pub ttl_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl_minutes: 60,
        }
    }
}

/// Caller identity resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token -> caller id.
    pub tokens: HashMap<String, String>,
}

/// Knowledge-base seeding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// TOML file of `[[documents]]` imported at startup.
    pub seed_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = CounselConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.port, 3040);
        assert!(config.chat.enabled);
        assert_eq!(config.chat.max_message_length, 2000);
        assert!((config.chat.similarity_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.chat.snippet_chars, 350);
        assert_eq!(config.sessions.capacity, 10_000);
        assert!(config.auth.tokens.is_empty());
        assert!(config.knowledge.seed_file.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/srv/counsel"
log_level = "debug"

[server]
port = 8080

[chat]
similarity_threshold = 0.25
max_documents = 3

[sessions]
capacity = 100
ttl_minutes = 5

[auth.tokens]
"abc123" = "user-1"

[knowledge]
seed_file = "/srv/counsel/knowledge.toml"
"#;
        let file = create_temp_config(content);
        let config = CounselConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/srv/counsel");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.chat.max_documents, 3);
        assert_eq!(config.chat.snippet_chars, 350);
        assert_eq!(config.sessions.ttl_minutes, 5);
        assert_eq!(config.auth.tokens.get("abc123").unwrap(), "user-1");
        assert_eq!(
            config.knowledge.seed_file.as_deref(),
            Some("/srv/counsel/knowledge.toml")
        );
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[general]\nlog_level = \"warn\"\n");
        let config = CounselConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.server.port, 3040);
        assert_eq!(config.sessions.capacity, 10_000);
    }

    #[test]
    fn test_load_invalid_toml_is_config_error() {
        let file = create_temp_config("[general\nlog_level = ");
        let err = CounselConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, CounselError::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = CounselConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.counsel/data");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CounselConfig::default();
        config
            .auth
            .tokens
            .insert("tok".to_string(), "caller".to_string());
        config.save(&path).unwrap();

        let reloaded = CounselConfig::load(&path).unwrap();
        assert_eq!(reloaded.server.port, config.server.port);
        assert_eq!(reloaded.auth.tokens.get("tok").unwrap(), "caller");
    }
}
