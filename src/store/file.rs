//! File-backed [`TokenStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::{self, ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::AuthTokens,
	store::{self, CompareAndSwapOutcome, StoreEntries, StoreError, StoreFuture, TokenStore},
};

/// Persists the token entries as one JSON object after each mutation.
///
/// Writes go to a sibling `.tmp` file that is synced and then renamed over the target, so a crash
/// leaves either the previous or the new snapshot on disk.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<StoreEntries>>,
}
impl FileStore {
	/// Opens the store at `path`, creating parent directories and reading any existing snapshot.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		create_parent_dir(&path)?;

		let entries = read_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(entries)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist(&self, entries: &StoreEntries) -> Result<(), StoreError> {
		let bytes = serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Serialization {
			message: format!("Token entries could not be encoded: {e}"),
		})?;

		create_parent_dir(&self.path)?;
		replace_file(&self.path, &bytes)
	}
}
impl TokenStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<AuthTokens>> {
		Box::pin(async move { Ok(store::tokens_from_entries(&self.inner.read())) })
	}

	fn save(&self, tokens: AuthTokens) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();

			store::write_entries(&mut next, tokens);
			self.persist(&next)?;
			*guard = next;

			Ok(())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		expected_access: &'a str,
		replacement: AuthTokens,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();
			let outcome = store::compare_and_swap_entries(&mut next, expected_access, replacement);

			if matches!(outcome, CompareAndSwapOutcome::Updated) {
				self.persist(&next)?;
				*guard = next;
			}

			Ok(outcome)
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist(&StoreEntries::new())?;
			guard.clear();

			Ok(())
		})
	}
}

fn read_snapshot(path: &Path) -> Result<StoreEntries, StoreError> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreEntries::new()),
		Err(e) => return Err(io_failure("read", path)(e)),
	};

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(StoreEntries::new());
	}

	serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
		message: format!("{} is not a flat JSON object: {e}", path.display()),
	})
}

fn create_parent_dir(path: &Path) -> Result<(), StoreError> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() =>
			fs::create_dir_all(parent).map_err(io_failure("create directory", parent)),
		_ => Ok(()),
	}
}

fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
	let tmp = path.with_extension("tmp");
	let mut file = File::create(&tmp).map_err(io_failure("create", &tmp))?;

	file.write_all(bytes).map_err(io_failure("write", &tmp))?;
	file.sync_all().map_err(io_failure("sync", &tmp))?;
	drop(file);

	fs::rename(&tmp, path).map_err(io_failure("replace", path))
}

fn io_failure(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> StoreError {
	let path = path.display().to_string();

	move |e| StoreError::Backend { message: format!("Could not {action} {path}: {e}") }
}
