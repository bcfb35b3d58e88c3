//! Storage contract and built-in stores for the session's token pair.
//!
//! Stores keep flat string entries under the fixed keys [`ACCESS_TOKEN_KEY`],
//! [`REFRESH_TOKEN_KEY`], and [`USER_ID_KEY`], mirroring a browser-style key-value store. A
//! missing access or refresh key means "logged out"; partially written entries never surface
//! as half-populated [`AuthTokens`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AuthTokens, TokenSecret},
};

/// Key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Key holding the opaque user identifier.
pub const USER_ID_KEY: &str = "userId";

/// Flat key-value snapshot persisted by the stores.
pub type StoreEntries = HashMap<String, String>;

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract shared by every caller of one session.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the stored pair, or `None` when either token is absent.
	fn load(&self) -> StoreFuture<'_, Option<AuthTokens>>;

	/// Persists a complete token pair, replacing whatever was stored.
	fn save(&self, tokens: AuthTokens) -> StoreFuture<'_, ()>;

	/// Replaces the stored pair only if its access token still equals `expected_access`.
	fn compare_and_swap<'a>(
		&'a self,
		expected_access: &'a str,
		replacement: AuthTokens,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;

	/// Removes every key, logging the user out.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Result of a [`TokenStore::compare_and_swap`] attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The access token matched and the pair was replaced.
	Updated,
	/// A different access token is stored; nothing was written.
	Mismatch,
	/// No complete pair is stored; nothing was written.
	Missing,
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Reads a complete pair out of flat entries.
pub fn tokens_from_entries(entries: &StoreEntries) -> Option<AuthTokens> {
	let access = entries.get(ACCESS_TOKEN_KEY).filter(|v| !v.is_empty())?;
	let refresh = entries.get(REFRESH_TOKEN_KEY).filter(|v| !v.is_empty())?;

	Some(AuthTokens {
		access_token: TokenSecret::new(access.as_str()),
		refresh_token: TokenSecret::new(refresh.as_str()),
		user_id: entries.get(USER_ID_KEY).cloned(),
	})
}

/// Writes a pair into flat entries, dropping a stale user id when the new pair has none.
pub fn write_entries(entries: &mut StoreEntries, tokens: AuthTokens) {
	entries.insert(ACCESS_TOKEN_KEY.into(), tokens.access_token.expose().into());
	entries.insert(REFRESH_TOKEN_KEY.into(), tokens.refresh_token.expose().into());

	match tokens.user_id {
		Some(user_id) => entries.insert(USER_ID_KEY.into(), user_id),
		None => entries.remove(USER_ID_KEY),
	};
}

pub(crate) fn compare_and_swap_entries(
	entries: &mut StoreEntries,
	expected_access: &str,
	replacement: AuthTokens,
) -> CompareAndSwapOutcome {
	let outcome = match tokens_from_entries(entries) {
		Some(current) if current.access_token.expose() == expected_access =>
			CompareAndSwapOutcome::Updated,
		Some(_) => CompareAndSwapOutcome::Mismatch,
		None => CompareAndSwapOutcome::Missing,
	};

	if matches!(outcome, CompareAndSwapOutcome::Updated) {
		write_entries(entries, replacement);
	}

	outcome
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn partial_entries_read_as_logged_out() {
		let mut entries = StoreEntries::new();

		entries.insert(ACCESS_TOKEN_KEY.into(), "access-only".into());

		assert_eq!(tokens_from_entries(&entries), None);

		entries.insert(REFRESH_TOKEN_KEY.into(), String::new());

		assert_eq!(tokens_from_entries(&entries), None);

		entries.insert(REFRESH_TOKEN_KEY.into(), "refresh".into());

		let tokens = tokens_from_entries(&entries).expect("Both keys should yield a pair.");

		assert_eq!(tokens.access_token.expose(), "access-only");
		assert_eq!(tokens.user_id, None);
	}

	#[test]
	fn write_entries_drops_stale_user_id() {
		let mut entries = StoreEntries::new();

		write_entries(&mut entries, AuthTokens::new("a", "r").with_user_id("u-1"));

		assert_eq!(entries.get(USER_ID_KEY).map(String::as_str), Some("u-1"));

		write_entries(&mut entries, AuthTokens::new("a2", "r2"));

		assert!(!entries.contains_key(USER_ID_KEY));
	}

	#[test]
	fn compare_and_swap_checks_access_token() {
		let mut entries = StoreEntries::new();

		assert_eq!(
			compare_and_swap_entries(&mut entries, "a", AuthTokens::new("b", "r")),
			CompareAndSwapOutcome::Missing
		);

		write_entries(&mut entries, AuthTokens::new("a", "r"));

		assert_eq!(
			compare_and_swap_entries(&mut entries, "stale", AuthTokens::new("b", "r")),
			CompareAndSwapOutcome::Mismatch
		);
		assert_eq!(
			compare_and_swap_entries(&mut entries, "a", AuthTokens::new("b", "r")),
			CompareAndSwapOutcome::Updated
		);
		assert_eq!(entries.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("b"));
	}
}
