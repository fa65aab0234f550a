// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh cycle activity.
#[derive(Debug, Default)]
pub struct RefreshCounters {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	adoptions: AtomicU64,
}
impl RefreshCounters {
	/// Returns the number of refresh calls actually issued to the transport.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh cycles that produced a new credential.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh cycles.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of waiters that adopted another caller's cycle
	/// outcome instead of issuing their own refresh call.
	pub fn adoptions(&self) -> u64 {
		self.adoptions.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_adoption(&self) {
		self.adoptions.fetch_add(1, Ordering::Relaxed);
	}
}
