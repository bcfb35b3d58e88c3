//! Refresh-token exchange with a singleflight guard and CAS rotation.
//!
//! Every refresh on one session runs under the same async mutex. A caller that was answered
//! `401` passes the access token it sent; once it holds the guard it compares that token with
//! the stored one and, if another caller already rotated it, reuses the stored pair instead of
//! hitting the refresh endpoint again. Rotations are written with
//! [`TokenStore::compare_and_swap`] keyed on the access token that was exchanged, so a
//! concurrent logout or login is never overwritten.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use ::http::{
	Method, Uri,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{AuthTokens, TokenSecret},
	error::{ConfigError, TransientError},
	http::{HttpRequest, HttpTransport},
	obs::{self, OpOutcome, OpSpan, Operation},
	session::AuthSession,
	store::CompareAndSwapOutcome,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequestBody<'a> {
	refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponseBody {
	access_token: TokenSecret,
	#[serde(default)]
	refresh_token: Option<TokenSecret>,
}

impl<C> AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Exchanges the stored refresh token for a new access token and persists the result.
	///
	/// Fails with [`Error::NotAuthenticated`] when no pair is stored and with
	/// [`Error::RefreshRejected`] when the backend refuses the exchange. The stored pair is left
	/// untouched on failure.
	pub async fn refresh_access_token(&self) -> Result<AuthTokens> {
		self.refresh(None).await
	}

	/// Refresh triggered by a `401` answer to a request that carried `rejected`.
	pub(crate) async fn refresh_after_unauthorized(
		&self,
		rejected: &TokenSecret,
	) -> Result<AuthTokens> {
		self.refresh(Some(rejected)).await
	}

	async fn refresh(&self, rejected: Option<&TokenSecret>) -> Result<AuthTokens> {
		const OP: Operation = Operation::TokenRefresh;

		let span = OpSpan::new(OP, "refresh_access_token");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;

				self.refresh_metrics.record_attempt();

				let result = self.refresh_locked(rejected).await;

				self.refresh_metrics.record_outcome(result.is_ok());

				result
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}

	async fn refresh_locked(&self, rejected: Option<&TokenSecret>) -> Result<AuthTokens> {
		const OP: Operation = Operation::TokenRefresh;

		let current = self.store.load().await?.ok_or(Error::NotAuthenticated)?;

		if let Some(rejected) = rejected
			&& current.access_token != *rejected
		{
			obs::op_event(OP, "access token already rotated; reusing it");

			return Ok(current);
		}

		let exchanged = self.exchange(&current.refresh_token).await?;
		let updated = current.rotated(exchanged.access_token, exchanged.refresh_token);

		match self.store.compare_and_swap(current.access_token.expose(), updated.clone()).await? {
			CompareAndSwapOutcome::Updated => Ok(updated),
			CompareAndSwapOutcome::Mismatch => {
				obs::op_event(OP, "store changed during refresh; using stored tokens");

				self.store.load().await?.ok_or(Error::NotAuthenticated)
			},
			CompareAndSwapOutcome::Missing => Err(Error::NotAuthenticated),
		}
	}

	async fn exchange(&self, refresh_token: &TokenSecret) -> Result<RefreshResponseBody> {
		let uri = self
			.config
			.endpoint(&self.config.refresh_path)?
			.as_str()
			.parse::<Uri>()
			.map_err(ConfigError::from)?;
		let body = serde_json::to_vec(&RefreshRequestBody { refresh_token: refresh_token.expose() })
			.map_err(|source| ConfigError::RequestBody { source })?;
		let (client_id_name, client_id_value) = self.config.client_id_header()?;
		let request: HttpRequest = ::http::Request::builder()
			.method(Method::POST)
			.uri(uri)
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.header(client_id_name, client_id_value)
			.body(body)
			.map_err(ConfigError::from)?;
		let response = self.http_client.send(request).await?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::RefreshRejected { status: status.as_u16() });
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			TransientError::ResponseParse { source, status: Some(status.as_u16()) }.into()
		})
	}
}
