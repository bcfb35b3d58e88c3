//! Calls a mock backend with an expired access token and lets the session refresh it.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use lexis_fetch::{
	auth::AuthTokens,
	config::ClientConfig,
	session::{FetchRequest, ReqwestSession},
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-expired");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.json_body(json!({ "refreshToken": "demo-refresh" }));
			then.status(200).json_body(json!({ "accessToken": "demo-fresh" }));
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-fresh");
			then.status(200).json_body(json!({ "name": "Demo User" }));
		})
		.await;
	let store = MemoryStore::default();
	let config = ClientConfig::builder(Url::parse(&server.base_url())?, "demo-app").build()?;
	let session = ReqwestSession::new(Arc::new(store.clone()), config);

	session.login(AuthTokens::new("demo-expired", "demo-refresh")).await?;

	let response = session.authenticated_fetch("/v1/profile", FetchRequest::get()).await?;

	println!("Status {}: {}.", response.status(), String::from_utf8_lossy(response.body()));

	if let Some(tokens) = store.load().await? {
		println!("Stored access token rotated: {}.", tokens.access_token.expose() == "demo-fresh");
	}

	expired.assert_async().await;
	refresh.assert_async().await;
	profile.assert_async().await;

	Ok(())
}
