// self
use crate::{
	_prelude::*,
	obs::{Operation, RecoveryAction, record_recovery_metric},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("rest_broker.call", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event and bumps the recovery counter for a local recovery decision.
pub fn record_recovery(op: Operation, action: RecoveryAction, delay: Option<Duration>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			op = op.as_str(),
			action = action.as_str(),
			delay_ms = delay.map(|d| i64::try_from(d.whole_milliseconds()).unwrap_or(i64::MAX)),
			"recovering failed attempt"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = delay;
	}

	record_recovery_metric(op, action);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recovery_events_noop_without_tracing() {
		record_recovery(Operation::Read, RecoveryAction::Backoff, Some(Duration::seconds(1)));
	}

	#[test]
	fn recovery_events_accept_out_of_range_delays() {
		record_recovery(Operation::Read, RecoveryAction::Backoff, Some(Duration::MAX));
		record_recovery(Operation::Read, RecoveryAction::Backoff, Some(Duration::MIN));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(Operation::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
