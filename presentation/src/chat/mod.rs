//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for LoganGPT.

mod repl;

pub use repl::ChatRepl;
