use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options used to construct an agent client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Log verbosity requested for the client
    pub log_level: String,
    /// Base URL of the agent endpoint
    pub base_url: String,
    /// Bearer token, if the endpoint needs one
    pub api_key: Option<String>,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Check the endpoint is reachable in `start()`
    pub health_check: bool,
}

/// System prompt supplied when a session is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMessageConfig {
    pub content: String,
}

/// Per-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub model: String,
    pub streaming: bool,
    pub system_message: Option<SystemMessageConfig>,
}

/// A single outgoing message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOptions {
    pub prompt: String,
}

/// Kind tag carried by every session event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    AssistantMessage,
    SessionIdle,
    Error,
    Other(String),
}

impl SessionEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AssistantMessage => "assistant.message",
            Self::SessionIdle => "session.idle",
            Self::Error => "error",
            Self::Other(kind) => kind,
        }
    }
}

impl From<&str> for SessionEventKind {
    fn from(kind: &str) -> Self {
        match kind {
            "assistant.message" => Self::AssistantMessage,
            "session.idle" => Self::SessionIdle,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload attached to an event
#[derive(Debug, Clone, Default)]
pub struct EventData {
    pub content: Option<String>,
    pub error: Option<String>,
}

/// An asynchronous notification from a session
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub data: EventData,
}

impl SessionEvent {
    pub fn assistant_message(content: impl Into<String>) -> Self {
        Self {
            kind: SessionEventKind::AssistantMessage,
            data: EventData {
                content: Some(content.into()),
                error: None,
            },
        }
    }

    pub fn idle() -> Self {
        Self {
            kind: SessionEventKind::SessionIdle,
            data: EventData::default(),
        }
    }

    pub fn error(payload: impl Into<String>) -> Self {
        Self {
            kind: SessionEventKind::Error,
            data: EventData {
                content: None,
                error: Some(payload.into()),
            },
        }
    }

    pub fn other(kind: impl Into<String>) -> Self {
        Self {
            kind: SessionEventKind::Other(kind.into()),
            data: EventData::default(),
        }
    }
}

/// Callback invoked for every session event, one at a time and in order
pub type EventHandler = Arc<dyn Fn(SessionEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            SessionEventKind::from("assistant.message"),
            SessionEventKind::AssistantMessage
        );
        assert_eq!(SessionEventKind::from("session.idle"), SessionEventKind::SessionIdle);
        assert_eq!(SessionEventKind::from("error"), SessionEventKind::Error);
        assert_eq!(
            SessionEventKind::from("tool.execution_start"),
            SessionEventKind::Other("tool.execution_start".into())
        );
        assert_eq!(SessionEventKind::SessionIdle.to_string(), "session.idle");
    }
}
