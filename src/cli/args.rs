use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "issue-sanitiser")]
#[command(version)]
#[command(about = "Stream an AI-sanitised rewrite of a GitHub issue", long_about = None)]
pub struct Cli {
    /// GitHub issue URL (e.g., https://github.com/owner/repo/issues/123)
    pub issue_url: Option<String>,

    /// Anything after the issue URL is accepted and ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub extra: Vec<String>,

    /// Model to use (defaults to gpt-4.1)
    #[arg(short, long, env = "ISSUE_SANITISER_MODEL")]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible agent endpoint
    #[arg(long, env = "ISSUE_SANITISER_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
