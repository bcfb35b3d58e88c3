//! Optional observability helpers for scraper and session operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `lexis_fetch.op` with the `op` and `stage` fields, plus
//!   events for scheduled retries and token refreshes.
//! - Enable `metrics` to increment `lexis_fetch_op_total` (labeled by `op` + `outcome`) and
//!   `lexis_fetch_retry_total` (labeled by `op`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Dictionary page scrape.
	Scrape,
	/// Bearer-authenticated backend call.
	AuthenticatedFetch,
	/// Refresh-token exchange.
	TokenRefresh,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Scrape => "scrape",
			Operation::AuthenticatedFetch => "authenticated_fetch",
			Operation::TokenRefresh => "token_refresh",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a public operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure returned to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
