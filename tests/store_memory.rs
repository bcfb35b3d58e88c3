// self
use lexis_fetch::{
	auth::AuthTokens,
	store::{
		ACCESS_TOKEN_KEY, CompareAndSwapOutcome, MemoryStore, REFRESH_TOKEN_KEY, TokenStore,
		USER_ID_KEY,
	},
};

#[tokio::test]
async fn save_and_load_round_trip() {
	let store = MemoryStore::default();
	let tokens = AuthTokens::new("access-1", "refresh-1").with_user_id("user-1");

	store.save(tokens.clone()).await.expect("Saving tokens into memory store should succeed.");

	let loaded = store
		.load()
		.await
		.expect("Loading tokens from memory store should succeed.")
		.expect("Saved tokens should remain present.");

	assert_eq!(loaded, tokens);

	let entries = store.entries();

	assert_eq!(entries.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("access-1"));
	assert_eq!(entries.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("refresh-1"));
	assert_eq!(entries.get(USER_ID_KEY).map(String::as_str), Some("user-1"));
}

#[tokio::test]
async fn cas_success_mismatch_and_missing() {
	let store = MemoryStore::with_tokens(AuthTokens::new("access-initial", "refresh-1"));
	let replacement = AuthTokens::new("access-new", "refresh-2");
	let outcome = store
		.compare_and_swap("access-initial", replacement.clone())
		.await
		.expect("CAS should succeed when access tokens match.");

	assert_eq!(outcome, CompareAndSwapOutcome::Updated);
	assert_eq!(
		store.load().await.expect("Loading updated tokens should succeed."),
		Some(replacement.clone())
	);

	let mismatch = store
		.compare_and_swap("access-initial", AuthTokens::new("access-stale", "refresh-stale"))
		.await
		.expect("CAS should report a mismatch when access tokens differ.");

	assert_eq!(mismatch, CompareAndSwapOutcome::Mismatch);
	assert_eq!(store.load().await.expect("Loading tokens should succeed."), Some(replacement));

	store.clear().await.expect("Clearing the store should succeed.");

	let missing = store
		.compare_and_swap("access-new", AuthTokens::new("access-x", "refresh-x"))
		.await
		.expect("CAS should report a missing pair after logout.");

	assert_eq!(missing, CompareAndSwapOutcome::Missing);
	assert!(store.entries().is_empty());
}

#[tokio::test]
async fn concurrent_cas_allows_single_winner() {
	let store = MemoryStore::with_tokens(AuthTokens::new("access-base", "refresh-base"));
	let store_a = store.clone();
	let store_b = store.clone();
	let task_a = tokio::spawn(async move {
		store_a
			.compare_and_swap("access-base", AuthTokens::new("access-a", "refresh-a"))
			.await
			.expect("CAS task A should complete successfully.")
	});
	let task_b = tokio::spawn(async move {
		store_b
			.compare_and_swap("access-base", AuthTokens::new("access-b", "refresh-b"))
			.await
			.expect("CAS task B should complete successfully.")
	});
	let (outcome_a, outcome_b) = tokio::join!(task_a, task_b);
	let outcomes = [
		outcome_a.expect("CAS task A should not panic."),
		outcome_b.expect("CAS task B should not panic."),
	];
	let successes =
		outcomes.iter().filter(|outcome| matches!(outcome, CompareAndSwapOutcome::Updated)).count();

	assert_eq!(successes, 1, "only one CAS should succeed");

	let winner = store
		.load()
		.await
		.expect("Loading final tokens should succeed.")
		.expect("Final tokens should remain present.");

	assert!(matches!(winner.access_token.expose(), "access-a" | "access-b"));
}

#[tokio::test]
async fn half_written_pair_reads_as_logged_out() {
	let store = MemoryStore::default();

	store.set_entry(ACCESS_TOKEN_KEY, "access-only");

	assert_eq!(store.load().await.expect("Loading should succeed."), None);

	store.set_entry(REFRESH_TOKEN_KEY, "");

	assert_eq!(store.load().await.expect("Loading should succeed."), None);

	store.set_entry(REFRESH_TOKEN_KEY, "refresh-1");

	assert_eq!(
		store.load().await.expect("Loading should succeed."),
		Some(AuthTokens::new("access-only", "refresh-1"))
	);
}
