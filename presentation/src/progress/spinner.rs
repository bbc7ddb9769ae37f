//! Spinner shown while the assistant is answering

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Message shown next to the spinner
pub const THINKING_MESSAGE: &str = "LoganGPT is thinking...";

/// Spinner bound to one backend round-trip. Cleared on drop.
pub struct ThinkingSpinner {
    bar: ProgressBar,
}

impl ThinkingSpinner {
    /// Start spinning, or stay invisible when `visible` is false.
    pub fn start(visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::style());
            bar.set_message(THINKING_MESSAGE);
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl Drop for ThinkingSpinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_when_quiet() {
        let spinner = ThinkingSpinner::start(false);
        assert!(spinner.is_hidden());
    }
}
