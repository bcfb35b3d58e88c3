//! Crate-level error types shared by the session, the stores, and the transports.
//!
//! The scraper never surfaces these directly: its public entry point folds every outcome into
//! [`ScrapeResult`](crate::scrape::ScrapeResult). Configuration failures raised while building a
//! scraper still use [`ConfigError`].

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// No complete token pair is stored, so the caller is logged out.
	#[error("No stored credentials are available; log in first.")]
	NotAuthenticated,
	/// The backend refused to exchange the refresh token.
	#[error("Token refresh was rejected with HTTP {status}.")]
	RefreshRejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Request body could not be encoded.
	#[error("Request body could not be encoded as JSON.")]
	RequestBody {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// A configured URL cannot be parsed.
	#[error("URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL must be hierarchical and use HTTP(S).
	#[error("Base URL `{url}` must be an http or https URL.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
	},

	/// Locale codes are short ASCII tags such as `en` or `pt-BR`.
	#[error("Locale `{locale}` is not a valid language tag.")]
	InvalidLocale {
		/// Offending locale.
		locale: String,
	},
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Required builder field was not supplied.
	#[error("Missing required configuration field `{field}`.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
	/// At least one attempt is required.
	#[error("The max_retries value must be at least 1.")]
	ZeroRetries,
	/// At least one translation must be returned.
	#[error("The max_translations value must be at least 1.")]
	ZeroTranslations,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<http::header::InvalidHeaderValue> for ConfigError {
	fn from(e: http::header::InvalidHeaderValue) -> Self {
		Self::HttpRequest(e.into())
	}
}
impl From<http::uri::InvalidUri> for ConfigError {
	fn from(e: http::uri::InvalidUri) -> Self {
		Self::HttpRequest(e.into())
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Upstream responded with JSON that does not match the expected shape.
	#[error("Upstream returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling upstream: {source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within its deadline.
	#[error("Request timed out after {} ms.", .after.as_millis())]
	Timeout {
		/// Deadline that elapsed.
		after: Duration,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling upstream.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
