//! Input mode system
//!
//! Defines the mode-based input model of the chat box:
//! - Normal mode: ordinary chat messages
//! - CommandMenu mode: the `/` menu is open
//! - Search mode: the next message is sent as a web search query
//!
//! `CommandMenu` and `Search` are variants of one enum, so they can never be
//! active at the same time.

use serde::{Deserialize, Serialize};

/// Character that opens the command menu when it is the entire input.
pub const COMMAND_TRIGGER: char = '/';

/// Input mode of the chat box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Ordinary chat input
    #[default]
    Normal,
    /// The command menu is showing
    CommandMenu,
    /// Input is a web search query
    Search,
}

impl InputMode {
    /// Get the mode indicator string for the prompt/status line
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Normal => "CHAT",
            Self::CommandMenu => "MENU",
            Self::Search => "SEARCH",
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Self::Search)
    }

    pub fn shows_command_menu(&self) -> bool {
        matches!(self, Self::CommandMenu)
    }
}

/// Input buffer plus its mode.
///
/// Transitions are a pure function of (current mode, current text, event);
/// nothing here performs I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    mode: InputMode,
    text: String,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The input buffer changed to `new_text`.
    ///
    /// In `Normal` or `CommandMenu` the menu shows exactly while the trigger
    /// character is the whole content. `Search` is left alone: text typed
    /// there is the query.
    pub fn on_input_changed(&mut self, new_text: impl Into<String>) {
        self.text = new_text.into();
        if self.mode == InputMode::Search {
            return;
        }
        self.mode = if self.is_trigger_only() {
            InputMode::CommandMenu
        } else {
            InputMode::Normal
        };
    }

    /// Replace the buffer wholesale (e.g. with a speech transcript).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.on_input_changed(text);
    }

    /// Pick the search command from the menu. Returns whether the mode changed.
    pub fn activate_search(&mut self) -> bool {
        if self.mode != InputMode::CommandMenu {
            return false;
        }
        self.mode = InputMode::Search;
        self.text.clear();
        true
    }

    /// Leave search mode. Returns whether the mode changed.
    pub fn cancel_search(&mut self) -> bool {
        if self.mode != InputMode::Search {
            return false;
        }
        self.mode = InputMode::Normal;
        self.text.clear();
        true
    }

    /// Empty the buffer without touching the mode.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn is_trigger_only(&self) -> bool {
        let mut chars = self.text.chars();
        chars.next() == Some(COMMAND_TRIGGER) && chars.next().is_none()
    }
}
