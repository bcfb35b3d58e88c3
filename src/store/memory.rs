//! Thread-safe in-memory [`TokenStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::AuthTokens,
	store::{self, CompareAndSwapOutcome, StoreEntries, StoreFuture, TokenStore},
};

type SharedEntries = Arc<RwLock<StoreEntries>>;

/// Keeps the token entries in-process; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedEntries);
impl MemoryStore {
	/// Creates a store already holding `tokens`.
	pub fn with_tokens(tokens: AuthTokens) -> Self {
		let mut entries = StoreEntries::new();

		store::write_entries(&mut entries, tokens);

		Self(Arc::new(RwLock::new(entries)))
	}

	/// Returns a snapshot of the raw entries.
	pub fn entries(&self) -> StoreEntries {
		self.0.read().clone()
	}

	/// Writes a single raw entry, bypassing pair validation.
	pub fn set_entry(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(key.into(), value.into());
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<AuthTokens>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(store::tokens_from_entries(&map.read())) })
	}

	fn save(&self, tokens: AuthTokens) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			store::write_entries(&mut map.write(), tokens);

			Ok(())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		expected_access: &'a str,
		replacement: AuthTokens,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let map = self.0.clone();

		Box::pin(async move {
			Ok(store::compare_and_swap_entries(&mut map.write(), expected_access, replacement))
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().clear();

			Ok(())
		})
	}
}
