//! Reqwest-backed [`Transport`] implementation.

// self
use crate::{
	_prelude::*,
	transport::{Method, RequestSpec, Response, Transport, TransportError, TransportFuture},
};

/// Thin wrapper around [`ReqwestClient`] bound to one API base URL.
///
/// Paths are appended to the base URL the way axios joins `baseURL + url`, so a
/// base of `https://host/api/v1` plus `/auth/login` yields
/// `https://host/api/v1/auth/login` instead of dropping the base path.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	base: Url,
}
impl ReqwestTransport {
	/// Creates a transport with a default client for the provided base URL.
	pub fn new(base: Url) -> Self {
		Self::with_client(ReqwestClient::default(), base)
	}

	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, base: Url) -> Self {
		Self { client, base }
	}

	fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
		let mut raw = self.base.as_str().trim_end_matches('/').to_owned();

		if !path.starts_with('/') {
			raw.push('/');
		}

		raw.push_str(path);

		Url::parse(&raw).map_err(|e| TransportError::InvalidRequest {
			message: format!("Invalid endpoint `{path}`: {e}"),
		})
	}
}
impl Transport for ReqwestTransport {
	fn send(&self, spec: RequestSpec) -> TransportFuture<'_> {
		Box::pin(async move {
			let url = self.endpoint(&spec.path)?;
			let method = match spec.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Delete => reqwest::Method::DELETE,
				Method::Patch => reqwest::Method::PATCH,
			};
			let mut builder = self.client.request(method, url);

			for (name, value) in &spec.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = &spec.body {
				let bytes =
					serde_json::to_vec(body).map_err(|e| TransportError::InvalidRequest {
						message: format!("Unencodable JSON body: {e}"),
					})?;

				builder = builder.header("content-type", "application/json").body(bytes);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(Response { status, headers, body })
		})
	}
}
