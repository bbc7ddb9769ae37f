//! Cancellation handle for live subscriptions
//!
//! Every callback-based subscription (auth state, store snapshots, speech
//! sessions) hands back a [`Subscription`]. The adapter keeps a clone of the
//! inner token and stops delivering once it is cancelled.

use tokio_util::sync::CancellationToken;

/// Handle to a live subscription.
///
/// Cancelled explicitly with [`cancel`](Self::cancel) or implicitly on drop.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Stop receiving updates.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_cancels_shared_token() {
        let token = CancellationToken::new();
        let subscription = Subscription::new(token.clone());
        assert!(!token.is_cancelled());
        drop(subscription);
        assert!(token.is_cancelled());
    }

    #[test]
    fn explicit_cancel() {
        let token = CancellationToken::new();
        let subscription = Subscription::new(token.clone());
        subscription.cancel();
        assert!(subscription.is_cancelled());
        assert!(token.is_cancelled());
    }
}
