// Gateway module for the agent client - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod sse;
mod streaming;
mod traits;
mod types;

// Public re-exports - the ONLY way to access agent functionality
pub use factory::AgentFactory;
pub use sse::{decode_chunk, SseBuffer, SseFrame, StreamPayload};
pub use streaming::{StreamingAgentClient, StreamingSession};
pub use traits::{AgentClient, AgentSession};
#[cfg(test)]
pub use traits::MockAgentClient;
pub use types::{
    ClientOptions, EventData, EventHandler, MessageOptions, SessionConfig, SessionEvent,
    SessionEventKind, SystemMessageConfig,
};
