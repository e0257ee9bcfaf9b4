pub mod agent;
pub mod app;
pub mod cli;
pub mod constants;
pub mod prompts;
pub mod runtime;
pub mod utils;

pub use agent::{AgentClient, AgentFactory, AgentSession};
pub use app::{load_config, Config};
pub use runtime::{IssueSanitiser, SanitiseOutcome};
pub use utils::SanitiserError;
