//! Minimum-interval gate shared by every call on one scraper.

// self
use crate::{_prelude::*, clock::Clock};

/// Ensures at least `min_interval` passes between successive permitted requests.
///
/// An async mutex stays locked while a caller waits out the interval, so concurrent callers pass
/// the gate one at a time in arrival order. The stamp of the last permitted request lives in a
/// separate blocking mutex that is never held across an await, so readers never queue behind
/// the gate.
#[derive(Debug)]
pub struct RateLimiter {
	min_interval: Duration,
	gate: AsyncMutex<()>,
	last_request: Mutex<Option<Instant>>,
}
impl RateLimiter {
	/// Creates an open gate; the first request never waits.
	pub fn new(min_interval: Duration) -> Self {
		Self { min_interval, gate: AsyncMutex::new(()), last_request: Mutex::new(None) }
	}

	/// Configured minimum spacing.
	pub fn min_interval(&self) -> Duration {
		self.min_interval
	}

	/// Waits until the gate opens, stamps the permitted request, and returns the wait applied.
	pub async fn acquire(&self, clock: &dyn Clock) -> Duration {
		let _turn = self.gate.lock().await;
		let wait = match self.last_request() {
			Some(previous) => self
				.min_interval
				.saturating_sub(clock.now().saturating_duration_since(previous)),
			None => Duration::ZERO,
		};

		if !wait.is_zero() {
			clock.sleep(wait).await;
		}

		*self.last_request.lock() = Some(clock.now());

		wait
	}

	/// Instant of the most recent permitted request, if any.
	pub fn last_request(&self) -> Option<Instant> {
		*self.last_request.lock()
	}
}
