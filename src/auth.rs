//! Credential models handed between the client and its credential store.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
