//! Normalized scrape outcomes and the per-attempt failure classification.

// crates.io
use ::http::StatusCode;
// self
use crate::{_prelude::*, error::TransportError};

/// Terminal failure reported inside [`ScrapeResult::Failed`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScrapeError {
	/// The word was empty after trimming; nothing was sent.
	#[error("Word cannot be empty")]
	EmptyWord,
	/// Upstream answered `404`.
	#[error("Translation not found for {word}")]
	NotFound {
		/// Queried word.
		word: String,
	},
	/// Upstream answered `403` or `429`; retrying would only prolong the block.
	#[error("Rate limited or forbidden by upstream (HTTP {status}); wait{} before retrying", wait_hint(.retry_after))]
	Blocked {
		/// HTTP status returned by upstream.
		status: u16,
		/// `Retry-After` hint, when upstream sent one.
		retry_after: Option<Duration>,
	},
	/// The page loaded but no candidates survived extraction.
	#[error("No translations found for {word}")]
	NoTranslations {
		/// Queried word.
		word: String,
	},
	/// Every attempt failed with a retryable error.
	#[error("{message}")]
	Exhausted {
		/// Attempts performed.
		attempts: u32,
		/// Message of the last attempt's failure.
		message: String,
	},
	/// The page URL for the word could not be formed.
	#[error("Cannot build request URL: {message}")]
	InvalidUrl {
		/// Underlying failure.
		message: String,
	},
}
impl ScrapeError {
	/// Message used when the loop ends without a recorded failure.
	pub const UNKNOWN_AFTER_RETRIES: &'static str = "Unknown error after retries";
}

fn wait_hint(retry_after: &Option<Duration>) -> String {
	match retry_after {
		Some(after) => format!(" at least {}s", after.as_secs().max(1)),
		None => String::new(),
	}
}

/// Outcome of one [`Scraper::scrape_translation`](crate::scrape::Scraper::scrape_translation)
/// call.
///
/// Serializes to `{"success", "translations", "word"?, "error"?}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "ScrapeResultWire")]
pub enum ScrapeResult {
	/// At least one translation was extracted.
	Found {
		/// Trimmed queried word.
		word: String,
		/// Unique candidates in first-seen order, capped by the configured maximum.
		translations: Vec<String>,
	},
	/// The call ended without translations.
	Failed {
		/// Trimmed queried word; absent when the input was empty.
		word: Option<String>,
		/// Why the call failed.
		error: ScrapeError,
	},
}
impl ScrapeResult {
	pub(crate) fn failed(word: Option<&str>, error: ScrapeError) -> Self {
		Self::Failed { word: word.map(str::to_owned), error }
	}

	/// Returns `true` for [`ScrapeResult::Found`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Found { .. })
	}

	/// Extracted translations; empty on failure.
	pub fn translations(&self) -> &[String] {
		match self {
			Self::Found { translations, .. } => translations,
			Self::Failed { .. } => &[],
		}
	}

	/// Queried word, when one was supplied.
	pub fn word(&self) -> Option<&str> {
		match self {
			Self::Found { word, .. } => Some(word),
			Self::Failed { word, .. } => word.as_deref(),
		}
	}

	/// Failure reason, if any.
	pub fn error(&self) -> Option<&ScrapeError> {
		match self {
			Self::Found { .. } => None,
			Self::Failed { error, .. } => Some(error),
		}
	}
}

#[derive(Serialize)]
struct ScrapeResultWire {
	success: bool,
	translations: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	word: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}
impl From<ScrapeResult> for ScrapeResultWire {
	fn from(result: ScrapeResult) -> Self {
		match result {
			ScrapeResult::Found { word, translations } =>
				Self { success: true, translations, word: Some(word), error: None },
			ScrapeResult::Failed { word, error } => Self {
				success: false,
				translations: Vec::new(),
				word,
				error: Some(error.to_string()),
			},
		}
	}
}

/// Classification of a single failed attempt.
#[derive(Debug, ThisError)]
pub(crate) enum AttemptError {
	#[error("Upstream returned HTTP 404.")]
	NotFound,
	#[error("Upstream returned HTTP {status}.")]
	Blocked { status: u16, retry_after: Option<Duration> },
	#[error("Upstream returned HTTP {0}.")]
	Status(StatusCode),
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl AttemptError {
	/// Failures that end the call immediately; everything else is retried.
	pub(crate) fn terminal(&self, word: &str) -> Option<ScrapeError> {
		match self {
			Self::NotFound => Some(ScrapeError::NotFound { word: word.into() }),
			Self::Blocked { status, retry_after } =>
				Some(ScrapeError::Blocked { status: *status, retry_after: *retry_after }),
			Self::Status(_) | Self::Transport(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn messages_match_the_documented_wording() {
		assert_eq!(ScrapeError::EmptyWord.to_string(), "Word cannot be empty");
		assert_eq!(
			ScrapeError::NotFound { word: "cat".into() }.to_string(),
			"Translation not found for cat"
		);
		assert_eq!(
			ScrapeError::NoTranslations { word: "cat".into() }.to_string(),
			"No translations found for cat"
		);

		let blocked =
			ScrapeError::Blocked { status: 429, retry_after: Some(Duration::from_secs(30)) };

		assert_eq!(
			blocked.to_string(),
			"Rate limited or forbidden by upstream (HTTP 429); wait at least 30s before retrying"
		);
	}

	#[test]
	fn wire_shape_mirrors_the_tagged_outcome() {
		let found = ScrapeResult::Found { word: "dog".into(), translations: vec!["犬".into()] };

		assert_eq!(
			serde_json::to_value(&found).expect("Found result should serialize."),
			serde_json::json!({ "success": true, "translations": ["犬"], "word": "dog" })
		);

		let failed = ScrapeResult::failed(None, ScrapeError::EmptyWord);

		assert_eq!(
			serde_json::to_value(&failed).expect("Failed result should serialize."),
			serde_json::json!({
				"success": false,
				"translations": [],
				"error": "Word cannot be empty"
			})
		);
		assert!(failed.translations().is_empty());
		assert_eq!(failed.word(), None);
	}

	#[test]
	fn only_not_found_and_blocks_end_the_call() {
		assert_eq!(AttemptError::Status(StatusCode::BAD_GATEWAY).terminal("cat"), None);
		assert_eq!(
			AttemptError::Transport(TransportError::Timeout { after: Duration::from_secs(1) })
				.terminal("cat"),
			None
		);
		assert_eq!(
			AttemptError::NotFound.terminal("cat"),
			Some(ScrapeError::NotFound { word: "cat".into() })
		);
		assert_eq!(
			AttemptError::Blocked { status: 403, retry_after: None }.terminal("cat"),
			Some(ScrapeError::Blocked { status: 403, retry_after: None })
		);
	}
}
