//! Debounced session-expired notification.
//!
//! The coordinator never navigates or renders anything itself; when a session
//! becomes unrecoverable it raises this signal exactly once, and the host
//! application decides what "redirect to login" means. Installing a new
//! credential re-arms the signal for the next expired-session transition.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::_prelude::*;

type Listener = Box<dyn Fn() + Send + Sync>;

/// One-shot-per-transition session-expired signal.
#[derive(Default)]
pub struct SessionSignal {
	expired: AtomicBool,
	listeners: Mutex<Vec<Listener>>,
}
impl SessionSignal {
	/// Registers a listener invoked on each expired-session transition.
	///
	/// Listeners run inline on the task that detected the expiry; keep them
	/// short and never call back into the coordinator from one.
	pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
		self.listeners.lock().push(Box::new(listener));
	}

	/// Raises the signal; returns `true` if listeners actually fired.
	///
	/// Repeated raises within one expired-session transition are swallowed so
	/// concurrent 401 fallout produces a single notification.
	pub fn raise(&self) -> bool {
		if self.expired.swap(true, Ordering::SeqCst) {
			return false;
		}

		for listener in self.listeners.lock().iter() {
			listener();
		}

		true
	}

	/// Re-arms the signal after a new session has been established.
	pub fn reset(&self) {
		self.expired.store(false, Ordering::SeqCst);
	}

	/// Returns `true` while the current session is marked expired.
	pub fn is_expired(&self) -> bool {
		self.expired.load(Ordering::SeqCst)
	}
}
impl Debug for SessionSignal {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionSignal")
			.field("expired", &self.is_expired())
			.field("listeners", &self.listeners.lock().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;

	#[test]
	fn repeated_raises_fire_once() {
		let signal = SessionSignal::default();
		let fired = Arc::new(AtomicUsize::new(0));
		let counter = fired.clone();

		signal.subscribe(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		});

		assert!(signal.raise());
		assert!(!signal.raise());
		assert!(!signal.raise());
		assert_eq!(fired.load(Ordering::SeqCst), 1);
		assert!(signal.is_expired());
	}

	#[test]
	fn reset_rearms_the_signal() {
		let signal = SessionSignal::default();
		let fired = Arc::new(AtomicUsize::new(0));
		let counter = fired.clone();

		signal.subscribe(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		});
		signal.raise();
		signal.reset();

		assert!(!signal.is_expired());
		assert!(signal.raise());
		assert_eq!(fired.load(Ordering::SeqCst), 2);
	}
}
