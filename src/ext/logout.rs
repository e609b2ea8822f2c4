//! Hook invoked once a session can no longer be recovered.

/// Receives the end-of-session signal after the client has cleared stored credentials,
/// cached responses, and in-flight bookkeeping.
pub trait LogoutHandler
where
	Self: Send + Sync,
{
	/// Called exactly once per ended session.
	fn on_logout(&self);
}

/// Handler that ignores the signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogout;
impl LogoutHandler for NoopLogout {
	fn on_logout(&self) {}
}
