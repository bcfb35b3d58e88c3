//! Credential models: redacted secrets and the stored access/refresh token pair.

pub mod secret;
pub mod tokens;

pub use secret::*;
pub use tokens::*;
