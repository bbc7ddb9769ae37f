//! Speech input adapters

mod terminal;

pub use terminal::TerminalSpeechInput;
