/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_AGENT_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_API_KEY_ENV: &str = "LITELLM_MASTER_KEY";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes for long generations
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;

// Agent defaults
pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_LOG_LEVEL: &str = "error";
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

// Issue URL validation
pub const GITHUB_HOST_MARKER: &str = "github.com";
pub const ISSUE_PATH_MARKER: &str = "/issues/";
pub const EXAMPLE_ISSUE_URL: &str = "https://github.com/owner/repo/issues/123";

// Prompt and console text
pub const PROMPT_PREFIX: &str = "Please sanitize this GitHub issue: ";
pub const COMPLETION_BANNER: &str = "✅ Issue sanitisation complete!";

// Config
pub const ENV_PREFIX: &str = "ISSUE_SANITISER_";
pub const APP_NAME: &str = "issue-sanitiser";
pub const LOCAL_CONFIG_PATH: &str = ".issue-sanitiser/config.toml";
