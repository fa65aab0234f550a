//! Transport primitives for authenticated API requests.
//!
//! The module exposes [`Transport`] as the relay's only dependency on an HTTP
//! stack, alongside the [`RequestSpec`]/[`Response`] value types exchanged with
//! it. A transport is responsible for exactly one thing: deliver a request and
//! hand back whatever the server said, including non-2xx statuses. Only
//! failures that produced no HTTP response at all become [`TransportError`]s;
//! the coordinator relies on that split to tell "retry with a fresh token"
//! apart from "the network is down".

#[cfg(feature = "reqwest")] mod reqwest;
#[cfg(feature = "reqwest")] pub use reqwest::ReqwestTransport;

// self
use crate::_prelude::*;

/// Lowercase header name used to carry the bearer token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Response, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing relay requests.
///
/// Implementations must be `Send + Sync` so a single transport instance can be
/// shared by every caller of one coordinator. The returned future owns its
/// request data, so implementations are free to move the spec into their own
/// async machinery.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Delivers the request and returns the raw response.
	fn send(&self, spec: RequestSpec) -> TransportFuture<'_>;
}

/// HTTP method subset used by the relay's callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PUT.
	Put,
	/// HTTP DELETE.
	Delete,
	/// HTTP PATCH.
	Patch,
}
impl Method {
	/// Returns the canonical uppercase method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
			Method::Patch => "PATCH",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Describes one outgoing request.
///
/// Callers hand the spec to [`Coordinator::request`](crate::coordinator::Coordinator::request)
/// by reference; the coordinator clones it before touching headers, so a spec
/// can be reused across retries and replays unchanged.
#[derive(Clone, Debug)]
pub struct RequestSpec {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the transport's base URL, query string included.
	pub path: String,
	/// Header map keyed by lowercase header names.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
}
impl RequestSpec {
	/// Creates a spec for the provided method and path.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), headers: BTreeMap::new(), body: None }
	}

	/// Shorthand for a GET spec.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a POST spec.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Adds a header, lowercasing the name.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_lowercase(), value.into());

		self
	}

	/// Attaches a JSON body.
	pub fn with_json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Returns the path component without its query string.
	pub fn route(&self) -> &str {
		self.path.split('?').next().unwrap_or(&self.path)
	}
}

/// Raw response handed back by a transport.
#[derive(Clone, Debug)]
pub struct Response {
	/// HTTP status code.
	pub status: u16,
	/// Response headers keyed by lowercase names.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl Response {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError { source, status: self.status })
	}
}

/// Transport-level failure; no HTTP response was received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure (DNS, TCP, TLS).
	#[error("Network error occurred while sending the request: {message}.")]
	Network {
		/// Transport-specific failure summary.
		message: String,
	},
	/// The request could not be constructed (bad URL, unencodable body).
	#[error("Request could not be constructed: {message}.")]
	InvalidRequest {
		/// Human-readable error payload.
		message: String,
	},
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::Network { message: e.to_string() }
	}
}

/// Error raised when a response body cannot be decoded as JSON.
#[derive(Debug, ThisError)]
#[error("Response body (HTTP {status}) could not be decoded as JSON.")]
pub struct DecodeError {
	/// Structured parsing failure, including the failing JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status of the undecodable response.
	pub status: u16,
}
