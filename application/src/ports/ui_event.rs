//! UI event types emitted by the session controller for presentation rendering
//!
//! These events form the output port from the application layer to the
//! presentation layer. The controller never renders anything itself.

use logangpt_domain::{InputMode, SessionState};

/// Events emitted by the session controller for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Derived session state changed
    SessionChanged(SessionState),
    /// The conversation list was replaced; carries the new length
    ConversationsUpdated(usize),
    /// The displayed message list changed; carries the new length
    MessagesUpdated(usize),
    /// Input buffer or mode changed
    InputUpdated { mode: InputMode, text: String },
    /// Voice input started or stopped
    ListeningChanged(bool),
    /// Side menu opened or closed
    SideMenuChanged(bool),
    /// A failure the user has to see
    Alert(String),
}
