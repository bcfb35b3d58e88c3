//! Scrapes a few words through the default reqwest transport against a local mock dictionary,
//! showing request spacing, the not-found path, and the serialized result shape.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use lexis_fetch::{config::ScraperConfig, scrape::ReqwestScraper};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/en/ja/dog");
			then.status(200).header("content-type", "text/html; charset=utf-8").body(
				"<h3 class=\"translation__item__pharse\">犬</h3>\
				 <h3 class=\"translation__item__pharse\">いぬ</h3>",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/en/ja/qwxz");
			then.status(404);
		})
		.await;

	let config = ScraperConfig::builder()
		.base_url(Url::parse(&server.base_url())?)
		.request_delay(Duration::from_millis(300))
		.build()?;
	let scraper = ReqwestScraper::new(config)?;

	for result in scraper.scrape_many(["dog", "qwxz", "  "]).await {
		println!("{}", serde_json::to_string(&result)?);
	}

	println!("Stats: {}.", serde_json::to_string(&scraper.stats())?);

	Ok(())
}
