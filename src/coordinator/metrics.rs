// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for credential renewals.
#[derive(Debug, Default)]
pub struct RenewalMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	skipped: AtomicU64,
}
impl RenewalMetrics {
	/// Refresh exchanges started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Exchanges that produced a new access credential.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Exchanges that failed or returned no access credential.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Single-flight waiters that reused a credential renewed by another request.
	pub fn skipped(&self) -> u64 {
		self.skipped.load(Ordering::Relaxed)
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

	pub(crate) fn record_skip(&self) {
		self.skipped.fetch_add(1, Ordering::Relaxed);
	}
}
