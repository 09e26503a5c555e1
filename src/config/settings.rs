//! Configuration settings for Samtal.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub speech: SpeechSettings,
    pub chat: ChatSettings,
    pub language_service: LanguageServiceSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub search: SearchSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.samtal".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Speech provider (whisper).
    pub provider: String,
    /// Transcription model to use.
    pub model: String,
    /// BCP-47 language tag for the calls being transcribed.
    pub language: String,
    /// How often the transcriber polls for new speech events.
    pub poll_interval_ms: u64,
    /// Hard deadline for one transcription session.
    pub session_deadline_seconds: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            provider: "whisper".to_string(),
            model: "whisper-1".to_string(),
            language: "en-US".to_string(),
            poll_interval_ms: 500,
            session_deadline_seconds: 300,
        }
    }
}

/// Chat-completion settings for compliance and query summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Chat model to use.
    pub model: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Text-analytics (language service) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageServiceSettings {
    /// Service endpoint base URL.
    pub endpoint: String,
    /// API key for the service.
    pub api_key: String,
    /// Document language sent with each request.
    pub language: String,
}

impl Default for LanguageServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            language: "en".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.samtal/vectors.db".to_string(),
        }
    }
}

/// Semantic search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum results per query; zero means unlimited.
    pub max_results: usize,
    /// Minimum cosine similarity for a match.
    pub min_similarity_score: f32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 0,
            min_similarity_score: 0.8,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SamtalError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("samtal")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.speech.model, "whisper-1");
        assert_eq!(settings.search.max_results, 0);
        assert!((settings.search.min_similarity_score - 0.8).abs() < f32::EPSILON);
        assert_eq!(settings.embedding.dimensions, 1536);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [speech]
            language = "nb-NO"

            [search]
            max_results = 5
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.speech.language, "nb-NO");
        assert_eq!(settings.speech.model, "whisper-1");
        assert_eq!(settings.search.max_results, 5);
        assert!((settings.search.min_similarity_score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_expand_path() {
        let expanded = Settings::expand_path("/tmp/samtal.db");
        assert_eq!(expanded, PathBuf::from("/tmp/samtal.db"));
    }
}
