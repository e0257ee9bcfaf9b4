use crate::constants::{EXAMPLE_ISSUE_URL, GITHUB_HOST_MARKER, ISSUE_PATH_MARKER};
use crate::utils::{Result, SanitiserError};

/// Check the issue URL argument.
///
/// This is a coarse substring test, not URL parsing: anything containing both
/// `github.com` and `/issues/` passes, and nothing else does. Matching is
/// case-sensitive.
pub fn validate_issue_url(arg: Option<&str>) -> Result<&str> {
    let url = arg.ok_or(SanitiserError::Usage)?;
    if url.contains(GITHUB_HOST_MARKER) && url.contains(ISSUE_PATH_MARKER) {
        Ok(url)
    } else {
        Err(SanitiserError::InvalidIssueUrl(url.to_string()))
    }
}

/// The two lines printed to stdout for a usage error
pub fn usage_message(err: &SanitiserError) -> Option<String> {
    match err {
        SanitiserError::Usage => Some(format!(
            "Usage: issue-sanitiser <github-issue-url>\nExample: issue-sanitiser {}",
            EXAMPLE_ISSUE_URL
        )),
        SanitiserError::InvalidIssueUrl(_) => Some(format!(
            "Error: Please provide a valid GitHub issue URL\nExample: {}",
            EXAMPLE_ISSUE_URL
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_issue_url() {
        let url = "https://github.com/owner/repo/issues/123";
        assert_eq!(validate_issue_url(Some(url)).unwrap(), url);
    }

    #[test]
    fn test_missing_argument() {
        let err = validate_issue_url(None).unwrap_err();
        assert!(matches!(err, SanitiserError::Usage));
        let message = usage_message(&err).unwrap();
        assert!(message.starts_with("Usage: issue-sanitiser <github-issue-url>"));
        assert!(message.contains("Example: issue-sanitiser https://github.com/owner/repo/issues/123"));
    }

    #[test]
    fn test_rejects_missing_markers() {
        for url in [
            "",
            "https://github.com/owner/repo/pull/5",
            "https://gitlab.com/owner/repo/issues/5",
            "https://GitHub.com/owner/repo/issues/5",
            "https://github.example.corp/owner/repo/issues/5",
            "https://github.com/owner/repo/Issues/5",
        ] {
            let err = validate_issue_url(Some(url)).unwrap_err();
            assert!(matches!(err, SanitiserError::InvalidIssueUrl(_)), "{url}");
            assert!(usage_message(&err)
                .unwrap()
                .starts_with("Error: Please provide a valid GitHub issue URL"));
        }
    }

    #[test]
    fn test_substring_heuristic_accepts_odd_strings() {
        // Not a URL, but both markers are present.
        assert!(validate_issue_url(Some("github.com and /issues/ somewhere")).is_ok());
    }

    #[test]
    fn test_non_usage_errors_have_no_usage_text() {
        assert!(usage_message(&SanitiserError::Send("x".into())).is_none());
    }
}
