//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for pulse
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent endpoint URL
    pub endpoint: Option<String>,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Seconds to wait for the agent to start responding
    pub timeout_secs: Option<u64>,
    /// Show the agent's thoughts while it works
    pub show_thoughts: Option<bool>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulse")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PULSE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Create the example config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, example_config())?;
        Ok(path)
    }

    /// Agent endpoint: flag, then `PULSE_AGENT_URL`, then config, then the default
    pub fn resolve_endpoint(&self, flag: Option<String>) -> String {
        flag.or_else(|| std::env::var("PULSE_AGENT_URL").ok())
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| pulse_sse::DEFAULT_ENDPOINT.to_string())
    }

    /// Bearer token: flag, then `PULSE_TOKEN`, then config
    pub fn resolve_token(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| std::env::var("PULSE_TOKEN").ok())
            .or_else(|| self.token.clone())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# pulse configuration file
# Place at ~/.config/pulse/config.toml (Linux/Mac) or %APPDATA%\pulse\config.toml (Windows)

# Streaming agent endpoint (PULSE_AGENT_URL overrides this)
endpoint = "http://localhost:5001/agent"

# Bearer token for the backend (PULSE_TOKEN overrides this)
# token = "..."

# Seconds to wait for the agent to start responding
timeout_secs = 30

# Show the agent's thoughts while it works
show_thoughts = false
"#
}
