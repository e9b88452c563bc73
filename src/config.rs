// Configuration management

use crate::error::{KmodError, Result};
use crate::kmod::{ToolPaths, DEFAULT_TARGET_TYPE, DEFAULT_WAIT_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub module_name: String,
    pub target_type: String,
    pub wait_attempts: usize,
    pub retry_delay_ms: u64,
    pub command_timeout_secs: u64,
    pub tools: ToolPaths,
    pub messages_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module_name: "kvdo".to_string(),
            target_type: DEFAULT_TARGET_TYPE.to_string(),
            wait_attempts: DEFAULT_WAIT_ATTEMPTS,
            retry_delay_ms: 1000,
            command_timeout_secs: 30,
            tools: ToolPaths::default(),
            messages_path: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Get default config path: ~/.config/kmodctl/config.yaml
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("kmodctl").join("config.yaml"))
    }

    /// Load config from path, falling back to defaults if not found
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Self::default_path().unwrap_or_default());

        let config = if config_path.is_file() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)
                .map_err(|e| KmodError::Config(format!("{}: {}", config_path.display(), e)))?
        } else {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to path
    pub fn save(&self, path: PathBuf) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), KmodError> {
        if self.module_name.is_empty() {
            return Err(KmodError::Config("module_name cannot be empty".to_string()));
        }
        if self.module_name.chars().any(|c| c.is_whitespace() || c == '\0') {
            return Err(KmodError::Config(format!(
                "module_name '{}' contains whitespace or NUL",
                self.module_name
            )));
        }
        if self.target_type.trim().is_empty() {
            return Err(KmodError::Config("target_type cannot be empty".to_string()));
        }
        if self.wait_attempts == 0 {
            return Err(KmodError::Config("wait_attempts must be at least 1".to_string()));
        }
        if self.command_timeout_secs == 0 {
            return Err(KmodError::Config("command_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
