//! The access/refresh token pair persisted by a [`TokenStore`](crate::store::TokenStore).

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Credentials issued at login and rotated by the refresh exchange.
///
/// Both secrets are mandatory, so a value of this type is always fully populated. Stores that
/// find only one of the two keys report the user as logged out instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
	/// Short-lived bearer credential.
	pub access_token: TokenSecret,
	/// Long-lived credential exchanged for new access tokens.
	pub refresh_token: TokenSecret,
	/// Opaque user identifier returned alongside the tokens, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
}
impl AuthTokens {
	/// Creates a token pair without a user identifier.
	pub fn new(
		access_token: impl Into<TokenSecret>,
		refresh_token: impl Into<TokenSecret>,
	) -> Self {
		Self {
			access_token: access_token.into(),
			refresh_token: refresh_token.into(),
			user_id: None,
		}
	}

	/// Attaches the opaque user identifier.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	/// Returns a copy with the access token replaced, and the refresh token too when the
	/// backend rotated it.
	pub fn rotated(&self, access_token: TokenSecret, refresh_token: Option<TokenSecret>) -> Self {
		Self {
			access_token,
			refresh_token: refresh_token.unwrap_or_else(|| self.refresh_token.clone()),
			user_id: self.user_id.clone(),
		}
	}
}
