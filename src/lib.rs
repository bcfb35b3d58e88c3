//! Rate-limited dictionary scraping with bounded retries, plus bearer-token fetches that
//! transparently recover from an expired access token.
//!
//! - [`scrape::Scraper`] spaces outbound requests through a per-instance gate, retries transient
//!   failures with linear backoff, and extracts translation candidates from the returned HTML.
//! - [`session::AuthSession`] injects the stored access token plus an application-id header and
//!   performs one refresh-and-retry when the backend answers `401`.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod scrape;
pub mod session;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{HashMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::{Duration, Instant},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
