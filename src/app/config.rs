use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, DEFAULT_AGENT_BASE_URL, DEFAULT_API_KEY_ENV, DEFAULT_LOG_LEVEL, DEFAULT_MODEL,
    ENV_PREFIX, HTTP_REQUEST_TIMEOUT_SECS, LOCAL_CONFIG_PATH,
};
use crate::utils::{Result, SanitiserError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Agent connection settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent: AgentSettings::default(),
            log_level: default_log_level(),
        }
    }
}

/// Agent connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Model identifier sent with every session
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Check the endpoint is reachable when the client starts
    pub health_check: bool,
    /// Ask for a streamed completion
    pub streaming: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_AGENT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            health_check: true,
            streaming: true,
        }
    }
}

impl AgentSettings {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

impl Config {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn with_overrides(mut self, model: Option<String>, base_url: Option<String>) -> Self {
        if let Some(model) = model {
            self.agent.model = model;
        }
        if let Some(base_url) = base_url {
            self.agent.base_url = base_url;
        }
        self
    }
}

/// Load configuration from multiple sources
///
/// Precedence, lowest first: defaults, global config, local config,
/// `ISSUE_SANITISER_` environment, then the explicit file if one was given.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = Vec::new();
    if let Some(dir) = get_config_dir() {
        files.push(dir.join("config.toml"));
    }
    files.push(PathBuf::from(LOCAL_CONFIG_PATH));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(SanitiserError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
    }

    extract(build_figment(&files, explicit))
}

fn build_figment(files: &[PathBuf], explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // ISSUE_SANITISER_AGENT__MODEL=... maps to agent.model
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }

    figment
}

fn extract(figment: Figment) -> Result<Config> {
    figment
        .extract()
        .map_err(|e| SanitiserError::Config(e.to_string()))
}

/// Get the global configuration directory, if the platform has one
pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-4.1");
        assert_eq!(config.log_level, "error");
        assert!(config.agent.streaming);
        assert!(config.agent.health_check);
    }

    #[test]
    fn test_toml_layering() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let local = temp_dir.path().join("local.toml");

        std::fs::write(
            &global,
            "log_level = \"warn\"\n[agent]\nmodel = \"gpt-4o\"\nbase_url = \"http://global:4000\"\n",
        )
        .unwrap();
        std::fs::write(&local, "[agent]\nbase_url = \"http://local:4000\"\n").unwrap();

        let config = extract(build_figment(&[global, local], None)).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.agent.base_url, "http://local:4000");
        // untouched keys keep their defaults
        assert_eq!(config.agent.request_timeout_secs, HTTP_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_explicit_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let explicit = temp_dir.path().join("explicit.toml");

        std::fs::write(&global, "[agent]\nmodel = \"gpt-4o\"\n").unwrap();
        std::fs::write(&explicit, "[agent]\nmodel = \"o3\"\nstreaming = false\n").unwrap();

        let config = extract(build_figment(&[global], Some(&explicit))).unwrap();
        assert_eq!(config.agent.model, "o3");
        assert!(!config.agent.streaming);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, SanitiserError::Config(_)));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_overrides(Some("claude-sonnet".into()), None);
        assert_eq!(config.agent.model, "claude-sonnet");
        assert_eq!(config.agent.base_url, DEFAULT_AGENT_BASE_URL);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad.toml");
        std::fs::write(&bad, "[agent]\nrequest_timeout_secs = \"soon\"\n").unwrap();

        let err = extract(build_figment(&[bad], None)).unwrap_err();
        assert!(matches!(err, SanitiserError::Config(_)));
    }
}
