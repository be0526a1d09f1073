use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AnkrError, Result};
use crate::types::DEFAULT_ACTOR;

/// Top-level configuration for the ankr service.
///
/// Loaded from `~/.ankr/config.toml` by default. Each section corresponds to
/// one component of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnkrConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub proposals: ProposalConfig,
}

impl AnkrConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnkrConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
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

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AnkrError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP port.
    pub port: u16,
    /// HTTP bind address.
    pub bind_address: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.ankr/data".to_string(),
            log_level: "info".to_string(),
            port: 3040,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Action lifecycle and pump settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Principal recorded when a request does not name one.
    pub default_actor: String,
    /// Expose `GET /actions` (development listing).
    pub dev_listing_enabled: bool,
    /// Pump batch size when the caller gives none.
    pub pump_default_limit: u32,
    /// Upper clamp for the pump batch size.
    pub pump_max_limit: u32,
    /// Row cap for the listing endpoint when no limit is given.
    pub list_default_limit: u32,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            default_actor: DEFAULT_ACTOR.to_string(),
            dev_listing_enabled: false,
            pump_default_limit: 5,
            pump_max_limit: 20,
            list_default_limit: 50,
        }
    }
}

/// A knowledge snippet the analyzer may cite in its telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    pub source: String,
    pub text: String,
}

/// Intent analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Closed vocabulary of intent flags the analyzer may emit.
    pub intent_flags: Vec<String>,
    /// Upper bound on a single classification call.
    pub classifier_timeout_ms: u64,
    /// Longest accepted chat message, in characters.
    pub max_message_chars: usize,
    /// Snippets scored against each message for telemetry.
    pub knowledge: Vec<KnowledgeSnippet>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            intent_flags: [
                "update_hours",
                "update_pricing",
                "update_contact",
                "promotion",
                "gallery",
                "content",
                "planning",
                "question",
                "urgent",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            classifier_timeout_ms: 2000,
            max_message_chars: 4000,
            knowledge: vec![
                KnowledgeSnippet {
                    source: "faq/hours".to_string(),
                    text: "Business hours are shown in the site footer and on the contact page."
                        .to_string(),
                },
                KnowledgeSnippet {
                    source: "faq/pricing".to_string(),
                    text: "Pricing tables list every service with its current price.".to_string(),
                },
                KnowledgeSnippet {
                    source: "guide/seo".to_string(),
                    text: "Organic traffic grows with regular blog topics and keyword content."
                        .to_string(),
                },
            ],
        }
    }
}

/// Action proposal engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalConfig {
    /// Maximum number of automatically proposed actions.
    pub max_auto_actions: usize,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            max_auto_actions: 4,
        }
    }
}
