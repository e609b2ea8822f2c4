//! User-facing failure notifications.

// self
use crate::notice::Notice;

/// Presentation-layer sink for terminal failures.
///
/// Implementations should return quickly; the client calls them inline on the task that
/// observed the failure.
pub trait Notifier
where
	Self: Send + Sync,
{
	/// Presents one notice to the user.
	fn notify(&self, notice: &Notice);
}

/// Default notifier that writes notices to the `tracing` pipeline when the feature is on.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;
impl Notifier for TracingNotifier {
	fn notify(&self, notice: &Notice) {
		#[cfg(feature = "tracing")]
		{
			tracing::warn!(
				kind = notice.kind.as_str(),
				status = ?notice.status,
				message = %notice.message,
				"request failed"
			);
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = notice;
		}
	}
}
