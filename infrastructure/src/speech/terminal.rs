//! Speech input for plain terminals, which have no recognizer

use async_trait::async_trait;
use logangpt_application::ports::speech_input::{SpeechError, SpeechInput, SpeechSink};
use logangpt_application::ports::subscription::Subscription;

/// Reports dictation as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSpeechInput;

#[async_trait]
impl SpeechInput for TerminalSpeechInput {
    fn is_supported(&self) -> bool {
        false
    }

    async fn listen(&self, _sink: SpeechSink) -> Result<Subscription, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}
