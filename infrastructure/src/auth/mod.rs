//! Auth provider adapters
//!
//! - [`LocalAuthProvider`]: in-process accounts, for offline use and tests
//! - [`IdentityToolkitAuthProvider`]: e-mail/password accounts of a hosted
//!   Identity Toolkit project, over its REST API

mod identity_toolkit;
mod listeners;
mod local;

pub use identity_toolkit::{DEFAULT_IDENTITY_TOOLKIT_ENDPOINT, IdentityToolkitAuthProvider};
pub use listeners::AuthListeners;
pub use local::LocalAuthProvider;
pub(crate) use local::normalize_email;
