// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for one scraper instance.
#[derive(Debug, Default)]
pub struct ScrapeMetrics {
	requests: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl ScrapeMetrics {
	/// Attempts that reached the network stage.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Calls that returned translations.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Calls that returned a failure, including empty input.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_outcome(&self, success: bool) {
		let counter = if success { &self.success } else { &self.failure };

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
