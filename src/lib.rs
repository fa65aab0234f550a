//! Session-aware bearer-token HTTP relay: de-duplicated refresh cycles, replay-on-401, and
//! session-expiry signaling in one crate built for API clients.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod obs;
pub mod session;
pub mod signal;
pub mod store;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
