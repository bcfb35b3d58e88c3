#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc, time::Duration};
// crates.io
use ::http::StatusCode;
use parking_lot::Mutex;
use url::Url;
// self
use lexis_fetch::{
	clock::ManualClock,
	config::ScraperConfig,
	error::TransportError,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
};

pub type Scripted = Result<HttpResponse, TransportError>;

/// Request observed by [`ScriptedTransport`], stamped with the virtual time it arrived at.
#[derive(Clone, Debug)]
pub struct RecordedCall {
	pub uri: String,
	pub at: Duration,
}

/// Transport that replays canned responses and records every request.
pub struct ScriptedTransport {
	clock: Arc<ManualClock>,
	responses: Mutex<VecDeque<Scripted>>,
	calls: Mutex<Vec<RecordedCall>>,
}
impl ScriptedTransport {
	pub fn new(
		clock: Arc<ManualClock>,
		responses: impl IntoIterator<Item = Scripted>,
	) -> Arc<Self> {
		Arc::new(Self {
			clock,
			responses: Mutex::new(responses.into_iter().collect()),
			calls: Default::default(),
		})
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.lock().clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		self.calls
			.lock()
			.push(RecordedCall { uri: request.uri().to_string(), at: self.clock.elapsed() });

		let next = self.responses.lock().pop_front().unwrap_or_else(|| {
			panic!("Unexpected request to {} with no scripted response left.", request.uri())
		});

		Box::pin(async move { next })
	}
}

pub fn html(status: u16, body: &str) -> Scripted {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() =
		StatusCode::from_u16(status).expect("Fixture status code should be valid.");

	Ok(response)
}

pub fn timed_out() -> Scripted {
	Err(TransportError::Timeout { after: Duration::from_secs(10) })
}

/// Page listing every `items` entry as a structured translation heading.
pub fn translation_page(items: &[&str]) -> String {
	let headings: String = items
		.iter()
		.map(|item| format!("<h3 class=\"translation__item__pharse\">{item}</h3>"))
		.collect();

	format!("<html><head><title>Dictionary</title></head><body>{headings}</body></html>")
}

pub fn scraper_config(base_url: &str) -> ScraperConfig {
	ScraperConfig::builder()
		.base_url(Url::parse(base_url).expect("Fixture base URL should parse."))
		.build()
		.expect("Fixture scraper config should build.")
}
