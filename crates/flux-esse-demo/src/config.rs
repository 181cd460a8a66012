//! Demo configuration
//!
//! Loaded from `.flux-esse-demo.toml` in the current directory, falling back to
//! `config.toml` in the platform config directory:
//! - Linux: `~/.config/flux-esse-demo/config.toml`
//! - macOS: `~/Library/Application Support/flux-esse-demo/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "flux-esse-demo";
const LOCAL_CONFIG_FILE: &str = ".flux-esse-demo.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DemoConfig {
    /// Title shown on the list panel
    #[serde(default = "default_title")]
    pub title: String,

    /// Todos added when the app starts
    #[serde(default)]
    pub initial_todos: Vec<String>,

    /// Display name of the todo context in logs and errors
    #[serde(default = "default_context_name")]
    pub context_name: String,

    /// Input poll interval in milliseconds
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_title() -> String {
    "flux-esse todos".to_string()
}

fn default_context_name() -> String {
    "TodoContext".to_string()
}

fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            initial_todos: Vec::new(),
            context_name: default_context_name(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl DemoConfig {
    /// Load config from CWD first, then the config directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded demo config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default demo config");
        Self::default()
    }
}

fn load_config_file() -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(LOCAL_CONFIG_FILE) {
        log::debug!("Loaded config from {}", LOCAL_CONFIG_FILE);
        return Some(content);
    }

    let path = global_config_path()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(content)
        }
        Err(_) => None,
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

/// Directory for release-build log files
pub fn cache_dir() -> anyhow::Result<PathBuf> {
    use anyhow::Context;

    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = DemoConfig::default();
        assert_eq!(config.title, "flux-esse todos");
        assert!(config.initial_todos.is_empty());
        assert_eq!(config.context_name, "TodoContext");
        assert_eq!(config.tick_rate_ms, 100);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            title = "groceries"
            initial_todos = ["milk", "bread"]
        "#;
        let config: DemoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title, "groceries");
        assert_eq!(config.initial_todos, vec!["milk", "bread"]);
        // Other fields should use defaults
        assert_eq!(config.tick_rate_ms, 100);
    }

    #[test]
    fn test_global_config_path() {
        if let Some(path) = global_config_path() {
            assert!(path.ends_with("flux-esse-demo/config.toml"));
        }
    }
}
