//! Transport primitives shared by the scraper and the authenticated session.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. Requests and responses
//! use the `http` crate types with fully buffered bodies so fakes can be written without a
//! network, and so timeouts and status classification live above the transport.

// crates.io
use ::http::{HeaderMap, header::RETRY_AFTER};
use time::{OffsetDateTime, format_description::well_known::Rfc2822};
// self
use crate::{_prelude::*, error::TransportError};

/// Outbound request with a buffered body.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Inbound response with a buffered body.
pub type HttpResponse = ::http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared behind an
/// `Arc` by several scrapers or sessions. A transport reports only network-level failures as
/// errors; every HTTP status, including `4xx` and `5xx`, is returned as an [`HttpResponse`] so
/// callers can classify it.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends the request and buffers the full response body.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Reads a `Retry-After` hint expressed either as delta-seconds or as an HTTP date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}

	// HTTP dates name the zone `GMT`; the RFC 2822 parser expects a numeric offset.
	let date = raw.strip_suffix(" GMT").map(|stem| format!("{stem} +0000"));

	if let Ok(moment) = OffsetDateTime::parse(date.as_deref().unwrap_or(raw), &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Duration::try_from(delta).ok();
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use ::http::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(120)));
	}

	#[test]
	fn retry_after_ignores_past_dates_and_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}

	#[test]
	fn retry_after_measures_future_http_dates() {
		let mut headers = HeaderMap::new();
		let later = OffsetDateTime::now_utc() + time::Duration::minutes(5);
		let numeric = later.format(&Rfc2822).expect("Fixture date should format.");
		let gmt = format!("{} GMT", numeric.trim_end_matches(" +0000"));

		for raw in [numeric, gmt] {
			headers.insert(
				RETRY_AFTER,
				HeaderValue::from_str(&raw).expect("Fixture date should be a valid header."),
			);

			let wait = parse_retry_after(&headers)
				.unwrap_or_else(|| panic!("{raw} should parse as a future date."));

			assert!(wait > Duration::from_secs(240), "{raw} gave {wait:?}.");
			assert!(wait <= Duration::from_secs(300), "{raw} gave {wait:?}.");
		}
	}
}
