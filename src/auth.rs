//! Credential model, redacted token secrets, and the derived session state.

pub mod credential;
pub mod secret;
pub mod session;

pub use credential::*;
pub use secret::*;
pub use session::*;
