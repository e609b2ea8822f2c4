//! Collaborator contracts supplied by the surrounding application.
//!
//! The client never presents anything to a user or navigates anywhere itself; it reports
//! terminal failures through a [`Notifier`] and announces an ended session through a
//! [`LogoutHandler`].

pub mod logout;
pub mod notifier;

pub use logout::*;
pub use notifier::*;
