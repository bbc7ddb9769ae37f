//! Identity holder shared by the auth adapters

use logangpt_application::ports::auth_provider::AuthSink;
use logangpt_application::ports::subscription::Subscription;
use logangpt_domain::Identity;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Current identity plus the sinks observing it.
#[derive(Default)]
pub struct AuthListeners {
    current: Mutex<Option<Identity>>,
    sinks: Mutex<Vec<(CancellationToken, AuthSink)>>,
}

impl AuthListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Identity> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the identity and notify every live sink.
    pub fn set(&self, identity: Option<Identity>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = identity.clone();

        let sinks: Vec<AuthSink> = {
            let mut sinks = self.sinks.lock().unwrap_or_else(|e| e.into_inner());
            sinks.retain(|(token, _)| !token.is_cancelled());
            sinks.iter().map(|(_, sink)| sink.clone()).collect()
        };
        for sink in sinks {
            sink(identity.clone());
        }
    }

    /// Register a sink; it receives the current identity immediately.
    pub fn register(&self, sink: AuthSink) -> Subscription {
        let token = CancellationToken::new();
        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((token.clone(), sink.clone()));
        sink(self.current());
        Subscription::new(token)
    }
}
