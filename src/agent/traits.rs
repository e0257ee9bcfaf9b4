use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::types::{EventHandler, MessageOptions, SessionConfig};
use crate::utils::Result;

/// Client side of a conversational agent service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Bring the client up; must succeed before sessions can be created
    async fn start(&mut self) -> Result<()>;

    /// Open a conversational session
    async fn create_session(&self, config: SessionConfig) -> Result<Box<dyn AgentSession>>;

    /// Shut the client down. Safe to call more than once.
    async fn stop(&mut self);
}

/// One conversation opened against an agent
#[async_trait]
pub trait AgentSession: Send + Sync {
    /// Session identifier assigned by the client
    fn id(&self) -> &str;

    /// Register the event handler. Must be called before `send`.
    fn on(&mut self, handler: EventHandler);

    /// Send a message and return its identifier. Response content arrives
    /// through the registered handler.
    async fn send(&self, options: MessageOptions) -> Result<String>;

    /// Tear the session down, dropping any in-flight response
    async fn destroy(&mut self);
}
