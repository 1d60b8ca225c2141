use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Disable AI/LLM functionality; every translation fails fast
    #[serde(default)]
    pub disable_ai: bool,

    /// Where saved contexts live; defaults to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets_path: Option<PathBuf>,

    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Llama chat model run in-process
    Local,
    /// OpenAI-compatible chat completions endpoint
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Base URL of the remote endpoint, without `/chat/completions`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the remote API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_backend() -> BackendKind {
    BackendKind::Local
}

fn default_endpoint() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_api_key_env() -> String {
    "QUADSLATOR_API_KEY".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            disable_ai: false,
            presets_path: None,
            generation: GenerationConfig::default(),
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    std::env::home_dir().context("Could not determine home directory")
}

impl Config {
    /// Get the default config file path: ~/.config/quadslator/config.toml
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".config").join("quadslator").join("config.toml"))
    }

    /// Directory for saved contexts and the log file: ~/.local/share/quadslator
    pub fn data_dir() -> Result<PathBuf> {
        Ok(home_dir()?.join(".local").join("share").join("quadslator"))
    }

    /// Resolved location of the saved-context file.
    pub fn presets_file(&self) -> Result<PathBuf> {
        match &self.presets_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join(format!(
                "{}.json",
                crate::preset_store::PRESETS_KEY
            ))),
        }
    }

    /// Load config from a file path, creating default config if file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            Ok(config)
        } else {
            let config = Config::default();
            config.save_to_path(path)?;
            Ok(config)
        }
    }

    /// Load config from default location or provided override
    pub fn load(config_path_override: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path_override.unwrap_or_else(|| {
            // Fall back to the working directory if home detection fails
            Self::default_config_path().unwrap_or_else(|_| PathBuf::from("quadslator.toml"))
        });

        Self::load_from_path(&config_path)
    }

    /// Save config to a file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}
