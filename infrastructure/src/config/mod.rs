//! Configuration file loading for LoganGPT
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LOGANGPT_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./logangpt.toml` or `./.logangpt.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/logangpt/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuthConfig, FileAuthProvider, FileBackendConfig, FileConfig,
    FileReplConfig, FileSessionConfig,
};
pub use loader::ConfigLoader;
