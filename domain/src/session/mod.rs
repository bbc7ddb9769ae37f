//! Session domain.
//!
//! - [`state::SessionState`] — where the user is in the login/chat flow
//! - [`state::AuthFlow`] — popup or redirect style federated sign-in

pub mod state;
