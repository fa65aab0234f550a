//! Scripted transport used by the coordinator integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, VecDeque},
	sync::{Arc, Mutex},
};
// self
use bearer_relay::transport::{
	RequestSpec, Response, Transport, TransportError, TransportFuture,
};

/// One scripted answer for a route.
#[derive(Clone, Debug)]
pub enum Reply {
	/// Respond with the given status and JSON body.
	Status(u16, serde_json::Value),
	/// Fail at the transport level without producing a response.
	Network(&'static str),
}
impl Reply {
	fn into_result(self) -> Result<Response, TransportError> {
		match self {
			Reply::Status(status, body) => Ok(Response {
				status,
				headers: Default::default(),
				body: serde_json::to_vec(&body).expect("Scripted body should serialize."),
			}),
			Reply::Network(message) => Err(TransportError::Network { message: message.into() }),
		}
	}
}

/// In-memory transport that pops scripted replies per route and logs every
/// request it saw, so tests can assert on call counts, headers, and bodies.
#[derive(Default)]
pub struct MockTransport {
	queues: Mutex<HashMap<String, VecDeque<Reply>>>,
	fallbacks: Mutex<HashMap<String, Reply>>,
	log: Mutex<Vec<RequestSpec>>,
}
impl MockTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Queues a one-shot reply for the route (query strings ignored).
	pub fn enqueue(&self, route: &str, reply: Reply) {
		self.queues.lock().unwrap().entry(route.into()).or_default().push_back(reply);
	}

	/// Sets the reply used whenever the route's queue is empty.
	pub fn always(&self, route: &str, reply: Reply) {
		self.fallbacks.lock().unwrap().insert(route.into(), reply);
	}

	/// Returns how many requests hit the route.
	pub fn calls_to(&self, route: &str) -> usize {
		self.log.lock().unwrap().iter().filter(|spec| spec.route() == route).count()
	}

	/// Returns every request that hit the route, in arrival order.
	pub fn requests_to(&self, route: &str) -> Vec<RequestSpec> {
		self.log.lock().unwrap().iter().filter(|spec| spec.route() == route).cloned().collect()
	}
}
impl Transport for MockTransport {
	fn send(&self, spec: RequestSpec) -> TransportFuture<'_> {
		Box::pin(async move {
			// Suspend once so concurrent callers interleave like they would
			// against a real network.
			tokio::task::yield_now().await;

			self.log.lock().unwrap().push(spec.clone());

			let route = spec.route().to_owned();
			let reply = {
				let mut queues = self.queues.lock().unwrap();

				match queues.get_mut(&route).and_then(VecDeque::pop_front) {
					Some(reply) => Some(reply),
					None => self.fallbacks.lock().unwrap().get(&route).cloned(),
				}
			};

			match reply {
				Some(reply) => reply.into_result(),
				None => Ok(Response {
					status: 404,
					headers: Default::default(),
					body: b"{}".to_vec(),
				}),
			}
		})
	}
}
