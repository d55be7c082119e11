//! GitHub App authentication.
//!
//! Two credentials are involved:
//!
//! - The **App JWT** proves the app's own identity. It is signed locally with
//!   the app's private key, lives ten minutes, and is refreshed on a timer by
//!   [`JwtRefresher`].
//! - An **installation access token** is minted with the JWT for one
//!   installation and used for every repository call. Tokens are kept in a
//!   [`TokenCache`] until they expire.

pub mod cache;
pub mod jwt;

use std::fmt;

pub use cache::{InMemoryTokenCache, InstallationToken, TokenCache};
pub use jwt::{AppJwt, JwtError, JwtRefresher, JwtSigner, RsaJwtSigner};

/// An installation access token, redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
