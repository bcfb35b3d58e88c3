#![cfg(feature = "reqwest")]

// std
use std::{sync::Arc, time::Duration};
// crates.io
use ::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use lexis_fetch::{
	auth::AuthTokens,
	config::ClientConfig,
	error::Error,
	session::{FetchRequest, ReqwestSession},
	store::{MemoryStore, TokenStore},
};

const CLIENT_ID: &str = "app-42";

fn build_session(server: &MockServer, store: &MemoryStore) -> ReqwestSession {
	let config = ClientConfig::builder(
		Url::parse(&server.base_url()).expect("Mock server URL should parse."),
		CLIENT_ID,
	)
	.build()
	.expect("Client config should build.");

	ReqwestSession::new(Arc::new(store.clone()), config)
}

fn logged_in_store() -> MemoryStore {
	MemoryStore::with_tokens(AuthTokens::new("access-old", "refresh-1").with_user_id("user-7"))
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_request_retried_once() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/words")
				.header("authorization", "Bearer access-old")
				.header("x-client-id", CLIENT_ID);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.header("x-client-id", CLIENT_ID)
				.json_body(json!({ "refreshToken": "refresh-1" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "accessToken": "access-new" }));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/words")
				.header("authorization", "Bearer access-new")
				.header("x-client-id", CLIENT_ID);
			then.status(200).body("[\"dog\"]");
		})
		.await;
	let response = session
		.authenticated_fetch("/v1/words", FetchRequest::get())
		.await
		.expect("Fetch should recover from the expired token.");

	rejected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.body(), b"[\"dog\"]");

	let stored = store.load().await.expect("Store load should succeed.");

	assert_eq!(stored, Some(AuthTokens::new("access-new", "refresh-1").with_user_id("user-7")));
	assert_eq!(session.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn failed_refresh_surfaces_error_without_third_request() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/words");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(403).json_body(json!({ "error": "refresh token revoked" }));
		})
		.await;
	let err = session
		.authenticated_fetch("/v1/words", FetchRequest::get())
		.await
		.expect_err("Fetch should fail when the refresh is rejected.");

	assert!(matches!(err, Error::RefreshRejected { status: 403 }));

	target.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	assert_eq!(
		store.load().await.expect("Store load should succeed.").map(|t| t.access_token),
		Some("access-old".into())
	);
	assert_eq!(session.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn second_unauthorized_is_returned_as_is() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/admin");
			then.status(401).body("still no");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).json_body(json!({ "accessToken": "access-new" }));
		})
		.await;
	let response = session
		.authenticated_fetch("v1/admin", FetchRequest::get())
		.await
		.expect("A second 401 is a response, not an error.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(response.body(), b"still no");

	target.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn other_statuses_pass_through_without_refresh() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/words");
			then.status(500);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).json_body(json!({ "accessToken": "unused" }));
		})
		.await;
	let response = session
		.authenticated_fetch("/v1/words", FetchRequest::get())
		.await
		.expect("Server errors are returned as responses.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	target.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn session_headers_override_caller_headers() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);
	let target = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/lists")
				.header("authorization", "Bearer access-old")
				.header("x-client-id", CLIENT_ID)
				.header("x-trace-id", "trace-1")
				.json_body(json!({ "name": "animals" }));
			then.status(201);
		})
		.await;
	let request = FetchRequest::json(&json!({ "name": "animals" }))
		.expect("JSON body should encode.")
		.header(AUTHORIZATION, HeaderValue::from_static("Bearer spoofed"))
		.header(HeaderName::from_static("x-client-id"), HeaderValue::from_static("spoofed"))
		.header(HeaderName::from_static("x-trace-id"), HeaderValue::from_static("trace-1"));
	let response = session
		.authenticated_fetch("/v1/lists", request)
		.await
		.expect("Fetch should succeed.");

	assert_eq!(response.status(), StatusCode::CREATED);

	target.assert_async().await;
}

#[tokio::test]
async fn logged_out_session_never_touches_the_network() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::default();
	let session = build_session(&server, &store);
	let any = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/words");
			then.status(200);
		})
		.await;

	assert!(!session.is_authenticated().await.expect("Store load should succeed."));

	let err = session
		.authenticated_fetch("/v1/words", FetchRequest::get())
		.await
		.expect_err("Fetch should fail without credentials.");

	assert!(matches!(err, Error::NotAuthenticated));

	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/words").header("authorization", "Bearer access-old");
			then.status(401);
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.delay(Duration::from_millis(200))
				.json_body(json!({ "accessToken": "access-new", "refreshToken": "refresh-2" }));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/words").header("authorization", "Bearer access-new");
			then.status(200);
		})
		.await;
	// Depending on scheduling, later callers may already send the rotated token.
	let (a, b, c) = tokio::join!(
		session.authenticated_fetch("/v1/words", FetchRequest::get()),
		session.authenticated_fetch("/v1/words", FetchRequest::get()),
		session.authenticated_fetch("/v1/words", FetchRequest::get()),
	);

	for response in [a, b, c] {
		assert_eq!(response.expect("Fetch should succeed.").status(), StatusCode::OK);
	}

	refresh.assert_calls_async(1).await;
	accepted.assert_calls_async(3).await;

	assert_eq!(
		store.load().await.expect("Store load should succeed."),
		Some(AuthTokens::new("access-new", "refresh-2").with_user_id("user-7"))
	);
}

#[tokio::test]
async fn logout_then_login_round_trip() {
	let server = MockServer::start_async().await;
	let store = logged_in_store();
	let session = build_session(&server, &store);

	session.logout().await.expect("Logout should succeed.");

	assert!(!session.is_authenticated().await.expect("Store load should succeed."));
	assert!(store.entries().is_empty());

	session.login(AuthTokens::new("a", "r")).await.expect("Login should succeed.");

	assert!(session.is_authenticated().await.expect("Store load should succeed."));
}
