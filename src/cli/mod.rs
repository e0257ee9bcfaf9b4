/// CLI argument parsing and validation - Gateway
mod args;
mod validate;

pub use args::Cli;
pub use validate::{usage_message, validate_issue_url};
