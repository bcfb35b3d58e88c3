//! Rate-limited dictionary scraping with bounded retries.
//!
//! Each [`Scraper::scrape_translation`] call passes the instance's [`RateLimiter`] once, then
//! performs up to `max_retries` attempts against the dictionary page. `404`, `403`, and `429`
//! end the call immediately; timeouts, network failures, and other non-success statuses back off
//! linearly (`retry_delay * attempt`) and try again. Every outcome, including invalid input, is
//! folded into a [`ScrapeResult`] so callers never handle an error path.

pub mod extract;
pub mod limiter;
pub mod outcome;

mod metrics;

pub use extract::{Script, extract_translations};
pub use limiter::RateLimiter;
pub use metrics::ScrapeMetrics;
pub use outcome::{ScrapeError, ScrapeResult};

// crates.io
use ::http::{
	HeaderMap, HeaderValue, Uri,
	header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	clock::{self, Clock, TokioClock},
	config::ScraperConfig,
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpTransport, parse_retry_after},
	obs::{self, OpOutcome, OpSpan, Operation},
	scrape::outcome::AttemptError,
};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

#[cfg(feature = "reqwest")]
/// Scraper specialized for the crate's default reqwest transport.
pub type ReqwestScraper = Scraper<ReqwestHttpClient>;

/// Point-in-time view of a scraper's counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperStats {
	/// Attempts that reached the transport.
	pub request_count: u64,
	/// Calls that returned translations.
	pub success_count: u64,
	/// Calls that returned a failure.
	pub failure_count: u64,
	/// Time since the gate last admitted a request; `None` before the first one.
	pub since_last_request: Option<Duration>,
}

/// Fetches dictionary pages for single words and extracts translation candidates.
///
/// The rate-limit gate is owned by the instance: share one scraper (for example behind an
/// `Arc`) to space requests across tasks, since two scrapers never coordinate.
pub struct Scraper<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every page request.
	pub http_client: Arc<C>,
	/// Time source for the gate, the backoff sleeps, and the per-attempt deadline.
	pub clock: Arc<dyn Clock>,
	/// Request and outcome counters.
	pub metrics: Arc<ScrapeMetrics>,
	config: Arc<ScraperConfig>,
	limiter: RateLimiter,
	headers: HeaderMap,
}
impl<C> Scraper<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a scraper that reuses the caller-provided transport.
	pub fn with_http_client(config: ScraperConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let headers = request_headers(&config)?;

		Ok(Self {
			limiter: RateLimiter::new(config.request_delay),
			config: Arc::new(config),
			http_client: http_client.into(),
			clock: Arc::new(TokioClock),
			metrics: Default::default(),
			headers,
		})
	}

	/// Settings fixed at construction; the gate and request headers are derived from them.
	pub fn config(&self) -> &ScraperConfig {
		&self.config
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Looks up `word` and returns its translations or the reason there are none.
	pub async fn scrape_translation(&self, word: &str) -> ScrapeResult {
		const OP: Operation = Operation::Scrape;

		let span = OpSpan::new(OP, "scrape_translation");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span.instrument(self.run(word)).await;
		let success = result.is_success();

		self.metrics.record_outcome(success);
		obs::record_op_outcome(OP, if success { OpOutcome::Success } else { OpOutcome::Failure });

		result
	}

	/// Scrapes each word in order; the gate spaces the requests.
	pub async fn scrape_many<I, S>(&self, words: I) -> Vec<ScrapeResult>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut results = Vec::new();

		for word in words {
			results.push(self.scrape_translation(word.as_ref()).await);
		}

		results
	}

	/// Snapshot of the counters and the time since the last admitted request.
	///
	/// Never waits on the rate-limit gate.
	pub fn stats(&self) -> ScraperStats {
		let since_last_request = self
			.limiter
			.last_request()
			.map(|at| self.clock.now().saturating_duration_since(at));

		ScraperStats {
			request_count: self.metrics.requests(),
			success_count: self.metrics.successes(),
			failure_count: self.metrics.failures(),
			since_last_request,
		}
	}

	async fn run(&self, word: &str) -> ScrapeResult {
		const OP: Operation = Operation::Scrape;

		let word = word.trim();

		if word.is_empty() {
			return ScrapeResult::failed(None, ScrapeError::EmptyWord);
		}

		let uri = match self.page_uri(word) {
			Ok(uri) => uri,
			Err(e) =>
				return ScrapeResult::failed(
					Some(word),
					ScrapeError::InvalidUrl { message: e.to_string() },
				),
		};

		if !self.limiter.acquire(self.clock.as_ref()).await.is_zero() {
			obs::op_event(OP, "waited for the rate limit gate");
		}

		let max_retries = self.config.max_retries;
		let mut last_error = None;

		for attempt in 1..=max_retries {
			let error = match self.attempt(&uri).await {
				Ok(body) => {
					let translations = extract::extract_translations(
						&body,
						word,
						&self.config.target_locale,
						self.config.max_translations,
					);

					if translations.is_empty() {
						return ScrapeResult::failed(
							Some(word),
							ScrapeError::NoTranslations { word: word.into() },
						);
					}

					return ScrapeResult::Found { word: word.into(), translations };
				},
				Err(e) => {
					if let Some(terminal) = e.terminal(word) {
						return ScrapeResult::failed(Some(word), terminal);
					}

					e
				},
			};

			if attempt < max_retries {
				let delay = self.config.retry_delay.saturating_mul(attempt);

				obs::retry_scheduled(OP, attempt, delay, &error);
				obs::record_retry(OP);
				self.clock.sleep(delay).await;
			}

			last_error = Some(error);
		}

		let message = last_error
			.map(|e| e.to_string())
			.unwrap_or_else(|| ScrapeError::UNKNOWN_AFTER_RETRIES.into());

		ScrapeResult::failed(Some(word), ScrapeError::Exhausted { attempts: max_retries, message })
	}

	async fn attempt(&self, uri: &Uri) -> Result<String, AttemptError> {
		let mut request = HttpRequest::new(Vec::new());

		*request.uri_mut() = uri.clone();
		*request.headers_mut() = self.headers.clone();

		self.metrics.record_request();

		let timeout = self.config.timeout;
		let response = clock::timeout(self.clock.as_ref(), timeout, self.http_client.send(request))
			.await
			.ok_or(TransportError::Timeout { after: timeout })??;
		let status = response.status();

		match status.as_u16() {
			404 => return Err(AttemptError::NotFound),
			403 | 429 =>
				return Err(AttemptError::Blocked {
					status: status.as_u16(),
					retry_after: parse_retry_after(response.headers()),
				}),
			_ if !status.is_success() => return Err(AttemptError::Status(status)),
			_ => (),
		}

		Ok(String::from_utf8_lossy(response.body()).into_owned())
	}

	fn page_uri(&self, word: &str) -> Result<Uri, ConfigError> {
		Ok(self.config.page_url(word)?.as_str().parse::<Uri>()?)
	}
}
#[cfg(feature = "reqwest")]
impl Scraper<ReqwestHttpClient> {
	/// Creates a scraper with its own reqwest-backed transport.
	pub fn new(config: ScraperConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for Scraper<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Scraper")
			.field("config", &self.config)
			.field("limiter", &self.limiter)
			.field("metrics", &self.metrics)
			.finish()
	}
}

fn request_headers(config: &ScraperConfig) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::new();

	headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
	headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
	headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

	Ok(headers)
}
