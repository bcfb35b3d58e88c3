//! Injectable time source for rate limiting, retry backoff, and per-attempt deadlines.

// std
use std::{future, pin, task::Poll};
// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Time source consulted by the scraper's gate and backoff loop.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current monotonic instant.
	fn now(&self) -> Instant;

	/// Suspends the caller for `duration`.
	fn sleep(&self, duration: Duration) -> SleepFuture<'_>;
}

/// Runs `future` until it completes or `clock` sleeps through `after`, whichever comes first.
///
/// The deadline sleep is only requested once `future` has returned `Pending`, so work that
/// completes on its first poll never touches the clock. Returns `None` on timeout.
pub async fn timeout<F>(clock: &dyn Clock, after: Duration, future: F) -> Option<F::Output>
where
	F: Future,
{
	let mut work = pin::pin!(future);
	let mut deadline: Option<SleepFuture<'_>> = None;

	future::poll_fn(|cx| {
		if let Poll::Ready(output) = work.as_mut().poll(cx) {
			return Poll::Ready(Some(output));
		}

		deadline.get_or_insert_with(|| clock.sleep(after)).as_mut().poll(cx).map(|()| None)
	})
	.await
}

/// Wall-clock implementation backed by tokio timers.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;
impl Clock for TokioClock {
	fn now(&self) -> Instant {
		tokio::time::Instant::now().into_std()
	}

	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		Box::pin(tokio::time::sleep(duration))
	}
}

/// Deterministic clock whose sleeps complete immediately.
///
/// Each sleep advances virtual time by the requested duration and is appended to a log, so
/// tests can assert both the spacing between requests and the exact backoff sequence. Under
/// [`timeout`], work still pending after its first poll times out at once.
#[derive(Debug)]
pub struct ManualClock {
	origin: Instant,
	elapsed: Mutex<Duration>,
	sleeps: Mutex<Vec<Duration>>,
}
impl ManualClock {
	/// Creates a clock frozen at the current instant.
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
			elapsed: Mutex::new(Duration::ZERO),
			sleeps: Default::default(),
		}
	}

	/// Moves virtual time forward without recording a sleep.
	pub fn advance(&self, by: Duration) {
		*self.elapsed.lock() += by;
	}

	/// Total virtual time elapsed since construction.
	pub fn elapsed(&self) -> Duration {
		*self.elapsed.lock()
	}

	/// Sleeps requested so far, in call order.
	pub fn sleeps(&self) -> Vec<Duration> {
		self.sleeps.lock().clone()
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}
impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.origin + self.elapsed()
	}

	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		self.sleeps.lock().push(duration);
		self.advance(duration);

		Box::pin(std::future::ready(()))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn manual_clock_records_and_advances() {
		let clock = ManualClock::new();
		let start = clock.now();

		clock.sleep(Duration::from_millis(250)).await;
		clock.advance(Duration::from_millis(50));
		clock.sleep(Duration::from_millis(500)).await;

		assert_eq!(clock.sleeps(), vec![Duration::from_millis(250), Duration::from_millis(500)]);
		assert_eq!(clock.now() - start, Duration::from_millis(800));
	}

	#[tokio::test]
	async fn tokio_clock_sleeps_for_real() {
		let clock = TokioClock;
		let start = clock.now();

		clock.sleep(Duration::from_millis(20)).await;

		assert!(clock.now() - start >= Duration::from_millis(20));
	}

	#[tokio::test]
	async fn timeout_passes_ready_work_through_without_sleeping() {
		let clock = ManualClock::new();

		assert_eq!(timeout(&clock, Duration::from_secs(5), async { 7 }).await, Some(7));
		assert!(clock.sleeps().is_empty());
	}

	#[tokio::test]
	async fn timeout_expires_pending_work_on_virtual_time() {
		let clock = ManualClock::new();
		let outcome = timeout(&clock, Duration::from_secs(5), std::future::pending::<()>()).await;

		assert_eq!(outcome, None);
		assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
	}

	#[tokio::test]
	async fn timeout_on_tokio_clock_cuts_slow_work() {
		let outcome = timeout(&TokioClock, Duration::from_millis(20), async {
			tokio::time::sleep(Duration::from_secs(5)).await;
		})
		.await;

		assert_eq!(outcome, None);
	}
}
