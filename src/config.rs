//! Coordinator tuning knobs and authentication endpoint conventions.

// self
use crate::_prelude::*;

/// Configuration for one [`Coordinator`](crate::coordinator::Coordinator) instance.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
	/// Remaining lifetime below which the credential is refreshed pre-emptively.
	pub refresh_threshold: Duration,
	/// Minimum spacing between successful refresh cycles.
	///
	/// An already-expired credential bypasses the cooldown; the cooldown only
	/// dampens pre-emptive refreshes of still-valid tokens.
	pub refresh_cooldown: Duration,
	/// Login path; never carries an auth header and never triggers refreshes.
	pub login_path: String,
	/// Refresh path; never refreshed pre-emptively, and its own 401 is terminal.
	pub refresh_path: String,
}
impl CoordinatorConfig {
	/// Default remaining lifetime that triggers a pre-emptive refresh.
	pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::minutes(10);

	/// Default minimum spacing between refresh cycles.
	pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::minutes(5);

	/// Overrides the pre-emptive refresh threshold.
	pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
		self.refresh_threshold = threshold;

		self
	}

	/// Overrides the refresh cooldown.
	pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
		self.refresh_cooldown = cooldown;

		self
	}

	/// Overrides the login path.
	pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh path.
	pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Returns `true` when the path targets either authentication endpoint.
	pub fn is_auth_path(&self, path: &str) -> bool {
		self.is_login_path(path) || self.is_refresh_path(path)
	}

	/// Returns `true` when the path targets the login endpoint.
	pub fn is_login_path(&self, path: &str) -> bool {
		Self::route(path) == self.login_path
	}

	/// Returns `true` when the path targets the refresh endpoint.
	pub fn is_refresh_path(&self, path: &str) -> bool {
		Self::route(path) == self.refresh_path
	}

	fn route(path: &str) -> &str {
		path.split('?').next().unwrap_or(path)
	}
}
impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self {
			refresh_threshold: Self::DEFAULT_REFRESH_THRESHOLD,
			refresh_cooldown: Self::DEFAULT_REFRESH_COOLDOWN,
			login_path: "/auth/login".into(),
			refresh_path: "/auth/refresh".into(),
		}
	}
}
