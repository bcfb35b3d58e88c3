// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by public operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("lexis_fetch.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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

/// Emits a warning that attempt `attempt` failed and the next one waits `delay`.
pub fn retry_scheduled(op: Operation, attempt: u32, delay: Duration, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			op = op.as_str(),
			attempt,
			delay_ms = delay.as_millis() as u64,
			%reason,
			"attempt failed; backing off"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, attempt, delay, reason);
	}
}

/// Emits a debug event for a noteworthy step inside an operation.
pub fn op_event(op: Operation, message: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = op.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, message);
	}
}
