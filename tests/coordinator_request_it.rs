mod common;

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use bearer_relay::{
	config::CoordinatorConfig,
	coordinator::{Coordinator, RefreshError},
	error::Error,
	session::Credential,
	store::MemoryStore,
	transport::{AUTHORIZATION_HEADER, RequestSpec, TransportError},
};
use common::{MockTransport, Reply};

fn build_coordinator(transport: Arc<MockTransport>) -> Coordinator {
	Coordinator::new(
		transport,
		Arc::new(MemoryStore::default()),
		CoordinatorConfig::default(),
	)
}

fn long_lived_credential() -> Credential {
	Credential::new("access-1")
		.with_refresh_token("refresh-1")
		.with_expires_at(OffsetDateTime::now_utc() + Duration::hours(2))
}

fn subscribe_counter(coordinator: &Coordinator) -> Arc<AtomicUsize> {
	let fired = Arc::new(AtomicUsize::new(0));
	let counter = fired.clone();

	coordinator.on_session_expired(move || {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	fired
}

#[tokio::test]
async fn bearer_header_is_attached_to_api_requests() {
	let transport = MockTransport::new();

	transport.always("/jobs", Reply::Status(200, json!({ "items": [] })));

	let coordinator = build_coordinator(transport.clone());

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");

	let spec = RequestSpec::get("/jobs?page=2");
	let response = coordinator.request(&spec).await.expect("Request should succeed.");

	assert_eq!(response.status, 200);
	// The caller's spec stays untouched.
	assert!(spec.headers.is_empty());

	let sent = transport.requests_to("/jobs").pop().expect("Request should have been logged.");

	assert_eq!(sent.headers.get(AUTHORIZATION_HEADER).map(String::as_str), Some("Bearer access-1"));
	assert_eq!(transport.calls_to("/auth/refresh"), 0);
}

#[tokio::test]
async fn login_requests_go_out_bare_and_skip_the_freshness_check() {
	let transport = MockTransport::new();

	transport.always("/auth/login", Reply::Status(200, json!({ "accessToken": "fresh" })));

	let coordinator = build_coordinator(transport.clone());

	// Even an expiring credential must not trigger a refresh for login calls.
	coordinator
		.install_credential(
			Credential::new("stale")
				.with_refresh_token("refresh-1")
				.with_expires_at(OffsetDateTime::now_utc() + Duration::minutes(1)),
		)
		.await
		.expect("Installing the credential should succeed.");

	let spec = RequestSpec::post("/auth/login")
		.with_header("Authorization", "Bearer stray")
		.with_json(json!({ "username": "admin", "password": "hunter2" }));
	let response = coordinator.request(&spec).await.expect("Login request should succeed.");

	assert_eq!(response.status, 200);

	let sent =
		transport.requests_to("/auth/login").pop().expect("Login request should have been logged.");

	assert!(!sent.headers.contains_key(AUTHORIZATION_HEADER));
	assert_eq!(transport.calls_to("/auth/refresh"), 0);
}

#[tokio::test]
async fn a_401_is_replayed_once_with_the_new_token() {
	let transport = MockTransport::new();

	transport.enqueue("/jobs", Reply::Status(401, json!({ "message": "expired" })));
	transport.enqueue("/jobs", Reply::Status(200, json!({ "items": [1, 2, 3] })));
	transport.always(
		"/auth/refresh",
		Reply::Status(200, json!({ "accessToken": "access-2", "expiresIn": 1800 })),
	);

	let coordinator = build_coordinator(transport.clone());

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");

	let response = coordinator
		.request(&RequestSpec::get("/jobs"))
		.await
		.expect("Replayed request should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(transport.calls_to("/auth/refresh"), 1);

	let requests = transport.requests_to("/jobs");

	assert_eq!(requests.len(), 2);
	assert_eq!(
		requests[0].headers.get(AUTHORIZATION_HEADER).map(String::as_str),
		Some("Bearer access-1"),
	);
	assert_eq!(
		requests[1].headers.get(AUTHORIZATION_HEADER).map(String::as_str),
		Some("Bearer access-2"),
	);
}

#[tokio::test]
async fn a_second_401_surfaces_without_another_refresh() {
	let transport = MockTransport::new();

	transport.always("/jobs", Reply::Status(401, json!({ "message": "still expired" })));
	transport.always(
		"/auth/refresh",
		Reply::Status(200, json!({ "accessToken": "access-2", "expiresIn": 1800 })),
	);

	let coordinator = build_coordinator(transport.clone());

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");

	let error = coordinator
		.request(&RequestSpec::get("/jobs"))
		.await
		.expect_err("A replayed 401 should surface as an auth failure.");

	assert!(matches!(error, Error::Auth { status: 401 }));
	assert_eq!(transport.calls_to("/auth/refresh"), 1);
	assert_eq!(transport.calls_to("/jobs"), 2);
}

#[tokio::test]
async fn network_failures_surface_without_touching_refresh_state() {
	let transport = MockTransport::new();

	transport.always("/jobs", Reply::Network("connection reset by peer"));

	let coordinator = build_coordinator(transport.clone());

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");

	let error = coordinator
		.request(&RequestSpec::get("/jobs"))
		.await
		.expect_err("Network failure should surface to the caller.");

	assert!(matches!(error, Error::Network(TransportError::Network { .. })));
	assert_eq!(transport.calls_to("/auth/refresh"), 0);
	assert_eq!(coordinator.counters().attempts(), 0);
}

#[tokio::test]
async fn non_401_statuses_pass_through_untouched() {
	let transport = MockTransport::new();

	transport.always("/jobs", Reply::Status(500, json!({ "message": "boom" })));

	let coordinator = build_coordinator(transport.clone());

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");

	let response = coordinator
		.request(&RequestSpec::get("/jobs"))
		.await
		.expect("Non-401 statuses should be returned, not raised.");

	assert_eq!(response.status, 500);
	assert!(!response.is_success());
	assert_eq!(transport.calls_to("/auth/refresh"), 0);
}

#[tokio::test]
async fn preemptive_refresh_runs_before_dispatch() {
	let transport = MockTransport::new();

	transport.always("/jobs", Reply::Status(200, json!({ "items": [] })));
	transport.always(
		"/auth/refresh",
		Reply::Status(200, json!({ "accessToken": "access-2", "expiresIn": 1800 })),
	);

	let coordinator = build_coordinator(transport.clone());

	coordinator
		.install_credential(
			Credential::new("access-1")
				.with_refresh_token("refresh-1")
				.with_expires_at(OffsetDateTime::now_utc() + Duration::minutes(9)),
		)
		.await
		.expect("Installing the credential should succeed.");

	let response =
		coordinator.request(&RequestSpec::get("/jobs")).await.expect("Request should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(transport.calls_to("/auth/refresh"), 1);

	let sent = transport.requests_to("/jobs").pop().expect("Request should have been logged.");

	assert_eq!(sent.headers.get(AUTHORIZATION_HEADER).map(String::as_str), Some("Bearer access-2"));
}

#[tokio::test]
async fn a_direct_refresh_request_hitting_401_is_terminal() {
	let transport = MockTransport::new();

	transport.always("/auth/refresh", Reply::Status(401, json!({ "message": "revoked" })));

	let coordinator = build_coordinator(transport.clone());
	let fired = subscribe_counter(&coordinator);

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");

	let response = coordinator
		.request(&RequestSpec::post("/auth/refresh").with_json(json!({ "refreshToken": "r" })))
		.await
		.expect("The terminal 401 is still a response, not an error.");

	assert_eq!(response.status, 401);
	assert_eq!(fired.load(Ordering::SeqCst), 1);
	assert!(
		coordinator
			.current_credential()
			.await
			.expect("Reading the store should succeed.")
			.is_none(),
	);
}

#[tokio::test]
async fn an_expired_session_signals_exactly_once_across_requests() {
	let transport = MockTransport::new();

	transport.always("/jobs", Reply::Status(401, json!({ "message": "expired" })));
	transport.always("/auth/refresh", Reply::Status(401, json!({ "message": "revoked" })));

	let coordinator = build_coordinator(transport.clone());
	let fired = subscribe_counter(&coordinator);

	coordinator
		.install_credential(
			Credential::new("access-1")
				.with_refresh_token("refresh-1")
				.with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(1)),
		)
		.await
		.expect("Installing the credential should succeed.");

	let first = coordinator
		.request(&RequestSpec::get("/jobs"))
		.await
		.expect_err("First request should fail through the refresh cycle.");

	assert!(matches!(first, Error::Refresh(RefreshError::Rejected { status: 401, .. })));

	let second = coordinator
		.request(&RequestSpec::get("/jobs"))
		.await
		.expect_err("Second request should fail without a credential.");

	assert!(matches!(second, Error::Refresh(RefreshError::MissingCredential)));
	assert_eq!(fired.load(Ordering::SeqCst), 1);
	assert_eq!(transport.calls_to("/auth/refresh"), 1);
}

#[tokio::test]
async fn sign_out_clears_the_session_without_signaling() {
	let transport = MockTransport::new();
	let coordinator = build_coordinator(transport.clone());
	let fired = subscribe_counter(&coordinator);

	coordinator
		.install_credential(long_lived_credential())
		.await
		.expect("Installing the credential should succeed.");
	coordinator.sign_out().await.expect("Sign-out should succeed.");

	assert!(
		coordinator
			.current_credential()
			.await
			.expect("Reading the store should succeed.")
			.is_none(),
	);
	assert_eq!(fired.load(Ordering::SeqCst), 0);
}
