//! The token-refresh coordinator sitting between callers and the transport.
//!
//! One [`Coordinator`] instance is constructed per application session and
//! cloned freely; every clone shares the same credential store, refresh gate,
//! and session-expired signal, so the "exactly one in-flight refresh" rule
//! holds across the whole process.

mod counters;
mod refresh;
mod request;

pub use counters::RefreshCounters;
pub use refresh::RefreshError;

use refresh::RefreshGate;

// self
use crate::{
	_prelude::*, config::CoordinatorConfig, session::Credential, signal::SessionSignal,
	store::CredentialStore, transport::Transport,
};

/// Coordinates authenticated requests and de-duplicated token refreshes.
///
/// The coordinator consumes two capabilities — a [`Transport`] that delivers
/// requests and a [`CredentialStore`] that persists the session credential —
/// and exposes one: [`request`](Coordinator::request). It owns every decision
/// about attaching tokens, refreshing pre-emptively, reacting to 401s, and
/// declaring the session expired; callers and stores never race it because all
/// credential mutation funnels through its refresh cycle.
#[derive(Clone)]
pub struct Coordinator {
	transport: Arc<dyn Transport>,
	store: Arc<dyn CredentialStore>,
	config: CoordinatorConfig,
	signal: Arc<SessionSignal>,
	counters: Arc<RefreshCounters>,
	gate: Arc<RefreshGate>,
}
impl Coordinator {
	/// Creates a coordinator over the provided transport and store.
	pub fn new(
		transport: Arc<dyn Transport>,
		store: Arc<dyn CredentialStore>,
		config: CoordinatorConfig,
	) -> Self {
		Self {
			transport,
			store,
			config,
			signal: Default::default(),
			counters: Default::default(),
			gate: Default::default(),
		}
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &CoordinatorConfig {
		&self.config
	}

	/// Returns the session-expired signal for direct subscription management.
	pub fn session_signal(&self) -> &SessionSignal {
		&self.signal
	}

	/// Registers a listener invoked once per expired-session transition.
	pub fn on_session_expired(&self, listener: impl Fn() + Send + Sync + 'static) {
		self.signal.subscribe(listener);
	}

	/// Returns the refresh cycle counters.
	pub fn counters(&self) -> &RefreshCounters {
		&self.counters
	}

	/// Stores a freshly issued credential (typically right after login) and
	/// re-arms the session-expired signal.
	pub async fn install_credential(&self, credential: Credential) -> Result<()> {
		self.store.set(credential).await?;
		self.signal.reset();

		Ok(())
	}

	/// Discards the session credential without raising the expired signal.
	pub async fn sign_out(&self) -> Result<()> {
		self.store.clear().await?;
		self.signal.reset();

		Ok(())
	}

	/// Returns the currently stored credential, if any.
	pub async fn current_credential(&self) -> Result<Option<Credential>> {
		Ok(self.store.get().await?)
	}
}
impl Debug for Coordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Coordinator")
			.field("config", &self.config)
			.field("signal", &self.signal)
			.finish()
	}
}
