use super::streaming::StreamingAgentClient;
use super::traits::AgentClient;
use super::types::{ClientOptions, SessionConfig, SystemMessageConfig};
use crate::app::Config;

/// Factory for building agent clients and session configs from configuration
pub struct AgentFactory;

impl AgentFactory {
    /// Client options derived from config; the API key is read from the
    /// environment variable the config names
    pub fn client_options(config: &Config) -> ClientOptions {
        ClientOptions {
            log_level: config.log_level.clone(),
            base_url: config.agent.base_url.clone(),
            api_key: config.agent.api_key(),
            request_timeout_secs: config.agent.request_timeout_secs,
            health_check: config.agent.health_check,
        }
    }

    /// Create the agent client for this configuration
    pub fn create(config: &Config) -> Box<dyn AgentClient> {
        Box::new(StreamingAgentClient::new(Self::client_options(config)))
    }

    /// Session settings with the given system prompt
    pub fn session_config(config: &Config, system_prompt: &str) -> SessionConfig {
        SessionConfig {
            model: config.agent.model.clone(),
            streaming: config.agent.streaming,
            system_message: Some(SystemMessageConfig {
                content: system_prompt.to_string(),
            }),
        }
    }
}
