//! CLI command definitions

use clap::Parser;
use logangpt_domain::AuthFlow;
use std::path::PathBuf;

/// CLI arguments for logangpt
#[derive(Parser, Debug)]
#[command(name = "logangpt")]
#[command(author, version, about = "LoganGPT - chat with an assistant, or search the web through it")]
#[command(long_about = r#"
LoganGPT is a terminal chat client for the LoganGPT assistant server.

Without a MESSAGE it starts an interactive chat. Conversations are kept per
signed-in account; use --local for a throwaway session without sign-in.
Typing a lone "/" opens the command menu, where "search" switches the next
messages to web search.

Configuration files are loaded from (in priority order):
1. LOGANGPT_* environment variables (e.g. LOGANGPT_BACKEND__BASE_URL)
2. --config <path>      Explicit config file
3. ./logangpt.toml      Project-level config
4. ~/.config/logangpt/config.toml   Global config

Example:
  logangpt "What is 2+2?"
  logangpt --search "weather in Lisbon today"
  logangpt --local
"#)]
pub struct Cli {
    /// Send one message and print the reply (no interactive chat)
    pub message: Option<String>,

    /// Send the one-shot MESSAGE as a web search query
    #[arg(short, long, requires = "message")]
    pub search: bool,

    /// Keep messages in memory only; no sign-in required
    #[arg(long)]
    pub local: bool,

    /// Federated sign-in style (popup or redirect)
    #[arg(long, value_name = "FLOW")]
    pub auth_flow: Option<AuthFlow>,

    /// Google account that /google signs in as (local auth provider)
    #[arg(long, value_name = "EMAIL")]
    pub google_account: Option<String>,

    /// Base URL of the assistant server
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
