/// Instructions given to the agent as its system prompt, embedded at build time
pub const ISSUE_SANITISER_AGENT: &str = include_str!("issue-sanitiser.agent.md");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_prompt_is_embedded() {
        assert!(ISSUE_SANITISER_AGENT.contains("# Issue Sanitiser"));
        assert!(!ISSUE_SANITISER_AGENT.trim().is_empty());
    }
}
