//! Immutable configuration for scrapers and authenticated sessions.
//!
//! Both structs are validated once, either through their builders or while deserializing
//! (durations are expressed in milliseconds and keys in camelCase), and are then passed by
//! value into the components that need them. Nothing here is process-global.

// crates.io
use ::http::{HeaderName, HeaderValue};
// self
use crate::{_prelude::*, error::ConfigError};

/// Dictionary site queried by default.
pub const DEFAULT_SCRAPE_BASE_URL: &str = "https://glosbe.com";
/// Desktop browser User-Agent sent with every scrape request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
	AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// Header carrying the application identifier on authenticated calls.
pub const DEFAULT_CLIENT_ID_HEADER: &str = "x-client-id";
/// Backend path that exchanges a refresh token for a new access token.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

const MAX_LOCALE_LEN: usize = 16;

/// Settings for a [`Scraper`](crate::scrape::Scraper) instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ScraperConfigBuilder")]
pub struct ScraperConfig {
	/// Site root; pages live at `<base>/<source>/<target>/<word>`.
	pub base_url: Url,
	/// Language of the queried words.
	pub source_locale: String,
	/// Language of the wanted translations.
	pub target_locale: String,
	/// Total attempts per word, including the first one.
	pub max_retries: u32,
	/// Base backoff; attempt `n` waits `retry_delay * n` before attempt `n + 1`.
	#[serde(with = "duration_ms")]
	pub retry_delay: Duration,
	/// Minimum spacing between permitted requests of one scraper.
	#[serde(with = "duration_ms")]
	pub request_delay: Duration,
	/// Deadline for a single attempt.
	#[serde(with = "duration_ms")]
	pub timeout: Duration,
	/// Upper bound on returned translations.
	pub max_translations: usize,
	/// User-Agent header value.
	pub user_agent: String,
}
impl ScraperConfig {
	/// Returns a builder seeded with the defaults.
	pub fn builder() -> ScraperConfigBuilder {
		ScraperConfigBuilder::default()
	}

	/// Builds the page URL for `word`, percent-encoding every path segment.
	pub fn page_url(&self, word: &str) -> Result<Url, ConfigError> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidBaseUrl { url: self.base_url.to_string() })?
			.pop_if_empty()
			.extend([self.source_locale.as_str(), self.target_locale.as_str(), word]);

		Ok(url)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		validate_base_url(&self.base_url)?;
		validate_locale(&self.source_locale)?;
		validate_locale(&self.target_locale)?;

		if self.max_retries == 0 {
			return Err(ConfigError::ZeroRetries);
		}
		if self.max_translations == 0 {
			return Err(ConfigError::ZeroTranslations);
		}

		HeaderValue::from_str(&self.user_agent)?;

		Ok(())
	}
}
impl TryFrom<ScraperConfigBuilder> for ScraperConfig {
	type Error = ConfigError;

	fn try_from(builder: ScraperConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Builder for [`ScraperConfig`] values.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScraperConfigBuilder {
	/// Site root; defaults to [`DEFAULT_SCRAPE_BASE_URL`].
	pub base_url: Option<Url>,
	/// Source locale (default `en`).
	pub source_locale: String,
	/// Target locale (default `ja`).
	pub target_locale: String,
	/// Total attempts (default 3).
	pub max_retries: u32,
	/// Base backoff (default 1 s).
	#[serde(with = "duration_ms")]
	pub retry_delay: Duration,
	/// Request spacing (default 1.5 s).
	#[serde(with = "duration_ms")]
	pub request_delay: Duration,
	/// Per-attempt deadline (default 10 s).
	#[serde(with = "duration_ms")]
	pub timeout: Duration,
	/// Result cap (default 5).
	pub max_translations: usize,
	/// User-Agent (default [`DEFAULT_USER_AGENT`]).
	pub user_agent: String,
}
impl ScraperConfigBuilder {
	/// Overrides the site root.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the source and target locales.
	pub fn locales(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
		self.source_locale = source.into();
		self.target_locale = target.into();

		self
	}

	/// Sets the total number of attempts per word.
	pub fn max_retries(mut self, attempts: u32) -> Self {
		self.max_retries = attempts;

		self
	}

	/// Sets the base backoff delay.
	pub fn retry_delay(mut self, delay: Duration) -> Self {
		self.retry_delay = delay;

		self
	}

	/// Sets the minimum spacing between requests.
	pub fn request_delay(mut self, delay: Duration) -> Self {
		self.request_delay = delay;

		self
	}

	/// Sets the per-attempt deadline.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Caps the number of returned translations.
	pub fn max_translations(mut self, max: usize) -> Self {
		self.max_translations = max;

		self
	}

	/// Overrides the User-Agent header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ScraperConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(DEFAULT_SCRAPE_BASE_URL)
				.map_err(|source| ConfigError::InvalidUrl { source })?,
		};
		let config = ScraperConfig {
			base_url,
			source_locale: self.source_locale,
			target_locale: self.target_locale,
			max_retries: self.max_retries,
			retry_delay: self.retry_delay,
			request_delay: self.request_delay,
			timeout: self.timeout,
			max_translations: self.max_translations,
			user_agent: self.user_agent,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for ScraperConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: None,
			source_locale: "en".into(),
			target_locale: "ja".into(),
			max_retries: 3,
			retry_delay: Duration::from_millis(1_000),
			request_delay: Duration::from_millis(1_500),
			timeout: Duration::from_millis(10_000),
			max_translations: 5,
			user_agent: DEFAULT_USER_AGENT.into(),
		}
	}
}

/// Settings for an [`AuthSession`](crate::session::AuthSession).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ClientConfigBuilder")]
pub struct ClientConfig {
	/// Backend root that request paths are appended to.
	pub base_url: Url,
	/// Application identifier sent on every call.
	pub client_id: String,
	/// Header name carrying [`client_id`](Self::client_id).
	pub client_id_header: String,
	/// Path of the refresh endpoint, relative to [`base_url`](Self::base_url).
	pub refresh_path: String,
}
impl ClientConfig {
	/// Returns a builder for the provided backend root and application identifier.
	pub fn builder(base_url: Url, client_id: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url, client_id)
	}

	/// Appends `path` to the backend root, tolerating duplicate or missing slashes.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let path = path.trim_start_matches('/');

		Url::parse(&format!("{base}/{path}")).map_err(|source| ConfigError::InvalidUrl { source })
	}

	/// Application-id header pair attached to every outbound call.
	pub fn client_id_header(&self) -> Result<(HeaderName, HeaderValue), ConfigError> {
		let name = HeaderName::from_bytes(self.client_id_header.as_bytes())
			.map_err(|_| ConfigError::InvalidHeaderName { name: self.client_id_header.clone() })?;
		let value = HeaderValue::from_str(&self.client_id)?;

		Ok((name, value))
	}
}
impl TryFrom<ClientConfigBuilder> for ClientConfig {
	type Error = ConfigError;

	fn try_from(builder: ClientConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfigBuilder {
	/// Backend root (required).
	pub base_url: Option<Url>,
	/// Application identifier (required).
	pub client_id: Option<String>,
	/// Header name (default [`DEFAULT_CLIENT_ID_HEADER`]).
	pub client_id_header: String,
	/// Refresh path (default [`DEFAULT_REFRESH_PATH`]).
	pub refresh_path: String,
}
impl ClientConfigBuilder {
	/// Creates a builder for the provided backend root and application identifier.
	pub fn new(base_url: Url, client_id: impl Into<String>) -> Self {
		Self { base_url: Some(base_url), client_id: Some(client_id.into()), ..Default::default() }
	}

	/// Overrides the application-id header name.
	pub fn client_id_header(mut self, name: impl Into<String>) -> Self {
		self.client_id_header = name.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = self.base_url.ok_or(ConfigError::MissingField { field: "baseUrl" })?;
		let client_id = self.client_id.ok_or(ConfigError::MissingField { field: "clientId" })?;

		validate_base_url(&base_url)?;

		let config = ClientConfig {
			base_url,
			client_id,
			client_id_header: self.client_id_header,
			refresh_path: self.refresh_path,
		};

		config.client_id_header()?;
		config.endpoint(&config.refresh_path)?;

		Ok(config)
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: None,
			client_id: None,
			client_id_header: DEFAULT_CLIENT_ID_HEADER.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
		}
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ConfigError::InvalidBaseUrl { url: url.to_string() })
	}
}

fn validate_locale(locale: &str) -> Result<(), ConfigError> {
	let valid = !locale.is_empty()
		&& locale.len() <= MAX_LOCALE_LEN
		&& locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

	if valid { Ok(()) } else { Err(ConfigError::InvalidLocale { locale: locale.into() }) }
}

mod duration_ms {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}
