// self
use crate::obs::{OpOutcome, Operation};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: Operation, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"lexis_fetch_op_total",
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

/// Counts a scheduled retry via the global metrics recorder (when enabled).
pub fn record_retry(op: Operation) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("lexis_fetch_retry_total", "op" => op.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = op;
	}
}
