//! Installation access token cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

use super::AccessToken;
use crate::types::InstallationId;

/// A minted installation access token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationToken {
    pub installation_id: InstallationId,
    pub token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

impl InstallationToken {
    /// Returns true if the token is still good `skew` past `now`.
    ///
    /// The skew absorbs clock drift between this process and GitHub, so a
    /// token is never used in the last moments before GitHub expires it.
    pub fn is_usable_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at > now + skew
    }
}

/// Storage for installation tokens, keyed by installation.
///
/// `set` always overwrites. Concurrent refreshes for the same installation
/// race and the last write wins; both tokens are valid, so either is fine.
pub trait TokenCache: Send + Sync {
    fn get(&self, installation_id: InstallationId) -> Option<InstallationToken>;

    fn set(&self, installation_id: InstallationId, token: InstallationToken);
}

/// Process-local token cache.
#[derive(Debug, Default)]
pub struct InMemoryTokenCache {
    tokens: RwLock<HashMap<InstallationId, InstallationToken>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenCache for InMemoryTokenCache {
    fn get(&self, installation_id: InstallationId) -> Option<InstallationToken> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&installation_id)
            .cloned()
    }

    fn set(&self, installation_id: InstallationId, token: InstallationToken) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(installation_id, token);
    }
}
