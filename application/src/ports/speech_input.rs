//! Speech Input port
//!
//! Optional dictation capability. Its absence is reported, never fatal.

use super::subscription::Subscription;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Event of a running recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Final transcript of the utterance
    Result(String),
    /// The recognizer stopped listening
    End,
    /// Recognition failed with an engine-specific code
    Error(String),
}

/// Callback receiving recognition events.
pub type SpeechSink = Arc<dyn Fn(SpeechEvent) + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech input is not supported")]
    Unsupported,

    #[error("Speech recognition failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Start one recognition session.
    async fn listen(&self, sink: SpeechSink) -> Result<Subscription, SpeechError>;
}
