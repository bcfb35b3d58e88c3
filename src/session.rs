//! Bearer-authenticated backend calls that recover once from an expired access token.
//!
//! [`AuthSession::authenticated_fetch`] attaches `Authorization: Bearer <access>` and the
//! application-id header to the caller's request. When the backend answers `401`, the session
//! runs the refresh exchange and re-issues the request exactly once with the new token. The
//! retried response is returned whatever its status; refresh failures surface as errors and no
//! further request is made.

pub mod refresh;

pub use refresh::*;

// crates.io
use ::http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{AuthTokens, TokenSecret},
	config::ClientConfig,
	error::ConfigError,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs::{self, OpOutcome, OpSpan, Operation},
	store::TokenStore,
};

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = AuthSession<ReqwestHttpClient>;

/// Caller-supplied part of an authenticated request.
///
/// The target URL comes from the session's [`ClientConfig`]; credentials and the application-id
/// header are added by the session and override same-named caller headers.
#[derive(Clone, Debug, Default)]
pub struct FetchRequest {
	/// HTTP method (defaults to `GET`).
	pub method: Method,
	/// Extra headers merged before the session's own.
	pub headers: HeaderMap,
	/// Request payload.
	pub body: Vec<u8>,
}
impl FetchRequest {
	/// Empty `GET` request.
	pub fn get() -> Self {
		Self::default()
	}

	/// `POST` request carrying `body` as-is.
	pub fn post(body: impl Into<Vec<u8>>) -> Self {
		Self { method: Method::POST, body: body.into(), ..Default::default() }
	}

	/// `POST` request carrying `value` encoded as JSON.
	pub fn json<T>(value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(value).map_err(|source| ConfigError::RequestBody { source })?;

		Ok(Self::post(body).header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
	}

	/// Overrides the method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Sets a header, replacing any previous value.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}
}

/// Talks to one backend on behalf of the user whose tokens live in [`AuthSession::store`].
///
/// Clones share the store, the refresh guard, and the metrics, so concurrent `401`s from any
/// clone trigger at most one refresh exchange per rotated token.
#[derive(Clone)]
pub struct AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for backend and refresh calls.
	pub http_client: Arc<C>,
	/// Token store shared with whatever performs login.
	pub store: Arc<dyn TokenStore>,
	/// Backend root, application id, and refresh path.
	pub config: ClientConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a session that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn TokenStore>,
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			config,
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Stores a freshly issued token pair.
	pub async fn login(&self, tokens: AuthTokens) -> Result<()> {
		self.store.save(tokens).await?;

		Ok(())
	}

	/// Removes every stored credential.
	pub async fn logout(&self) -> Result<()> {
		self.store.clear().await?;

		Ok(())
	}

	/// Returns `true` when a complete token pair is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store.load().await?.is_some())
	}

	/// Sends `request` to `path` under the backend root with the stored access token.
	///
	/// A `401` answer triggers one refresh exchange and one retry with the new token. Every
	/// other status, including a second `401`, is returned to the caller unchanged.
	pub async fn authenticated_fetch(
		&self,
		path: &str,
		request: FetchRequest,
	) -> Result<HttpResponse> {
		const OP: Operation = Operation::AuthenticatedFetch;

		let span = OpSpan::new(OP, "authenticated_fetch");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let tokens = self.store.load().await?.ok_or(Error::NotAuthenticated)?;
				let uri =
					self.config.endpoint(path)?.as_str().parse::<Uri>().map_err(ConfigError::from)?;
				let response = self.send_with(&uri, &request, &tokens.access_token).await?;

				if response.status() != StatusCode::UNAUTHORIZED {
					return Ok(response);
				}

				obs::op_event(OP, "access token rejected; refreshing");

				let refreshed = self.refresh_after_unauthorized(&tokens.access_token).await?;

				self.send_with(&uri, &request, &refreshed.access_token).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}

	async fn send_with(
		&self,
		uri: &Uri,
		request: &FetchRequest,
		access_token: &TokenSecret,
	) -> Result<HttpResponse> {
		let (client_id_name, client_id_value) = self.config.client_id_header()?;
		let mut outbound = HttpRequest::new(request.body.clone());

		*outbound.method_mut() = request.method.clone();
		*outbound.uri_mut() = uri.clone();

		let headers = outbound.headers_mut();

		headers.extend(request.headers.clone());
		headers.insert(AUTHORIZATION, access_token.bearer()?);
		headers.insert(client_id_name, client_id_value);

		Ok(self.http_client.send(outbound).await?)
	}
}
#[cfg(feature = "reqwest")]
impl AuthSession<ReqwestHttpClient> {
	/// Creates a session with its own reqwest-backed transport.
	pub fn new(store: Arc<dyn TokenStore>, config: ClientConfig) -> Self {
		Self::with_http_client(store, config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthSession")
			.field("config", &self.config)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
