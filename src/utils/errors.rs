use thiserror::Error;

/// Main error type for the issue sanitiser
#[derive(Error, Debug)]
pub enum SanitiserError {
    #[error("Usage: issue-sanitiser <github-issue-url>")]
    Usage,

    #[error("Please provide a valid GitHub issue URL (got {0})")]
    InvalidIssueUrl(String),

    #[error("Failed to start agent client: {0}")]
    ClientStart(String),

    #[error("Failed to create session: {0}")]
    SessionCreate(String),

    #[error("Failed to send message: {0}")]
    Send(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SanitiserError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        // Every failure collapses onto one status; callers only distinguish
        // success from failure.
        1
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SanitiserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_non_zero() {
        let errors = [
            SanitiserError::Usage,
            SanitiserError::ClientStart("refused".into()),
            SanitiserError::SessionCreate("refused".into()),
            SanitiserError::Send("refused".into()),
            SanitiserError::Agent("rate limited".into()),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }

    #[test]
    fn test_fatal_messages() {
        let err = SanitiserError::ClientStart("connection refused".into());
        assert_eq!(
            err.to_string(),
            "Failed to start agent client: connection refused"
        );
    }
}
