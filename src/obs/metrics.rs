// self
use crate::obs::{CallOutcome, Operation, RecoveryAction};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(op: Operation, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"rest_broker_call_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

/// Records a recovery decision via the global metrics recorder (when enabled).
pub fn record_recovery_metric(op: Operation, action: RecoveryAction) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"rest_broker_recovery_total",
			"op" => op.as_str(),
			"action" => action.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, action);
	}
}
