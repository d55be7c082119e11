//! App JWT signing and refresh.
//!
//! GitHub accepts App JWTs for at most ten minutes. [`JwtRefresher`] signs one
//! at startup and replaces it on a fixed period, so requests never wait on
//! signing and always read whatever JWT is current.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default period between JWT refreshes.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(300);

/// Backdating applied to `iat` to tolerate clock drift.
const ISSUED_AT_BACKDATE_SECS: i64 = 60;

/// Lifetime requested for each JWT (GitHub's maximum).
const JWT_LIFETIME_SECS: i64 = 600;

/// Errors signing an App JWT.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid App private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign App JWT: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// A signed App JWT, redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AppJwt(String);

impl AppJwt {
    pub fn new(jwt: impl Into<String>) -> Self {
        AppJwt(jwt.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AppJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppJwt(***)")
    }
}

/// Produces signed App JWTs.
pub trait JwtSigner: Send + Sync {
    fn sign(&self, now: DateTime<Utc>) -> Result<AppJwt, JwtError>;
}

/// RS256 signer using the App's PEM private key.
#[derive(Clone)]
pub struct RsaJwtSigner {
    app_id: String,
    key: EncodingKey,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iat: i64,
    exp: i64,
    iss: &'a str,
}

impl RsaJwtSigner {
    /// Creates a signer from an App id and a PEM-encoded RSA private key.
    pub fn from_pem(app_id: impl Into<String>, pem: &[u8]) -> Result<Self, JwtError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(JwtError::InvalidKey)?;
        Ok(Self {
            app_id: app_id.into(),
            key,
        })
    }
}

impl JwtSigner for RsaJwtSigner {
    fn sign(&self, now: DateTime<Utc>) -> Result<AppJwt, JwtError> {
        let now = now.timestamp();
        let claims = Claims {
            iat: now - ISSUED_AT_BACKDATE_SECS,
            exp: now + JWT_LIFETIME_SECS,
            iss: &self.app_id,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map(AppJwt)
            .map_err(JwtError::Signing)
    }
}

impl fmt::Debug for RsaJwtSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaJwtSigner")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

/// Owner of the current App JWT.
///
/// Cloning yields another handle to the same JWT.
#[derive(Clone)]
pub struct JwtRefresher {
    current: Arc<RwLock<AppJwt>>,
}

impl JwtRefresher {
    /// Signs an initial JWT and spawns a task that re-signs every `period`
    /// until `shutdown` is cancelled.
    ///
    /// Fails if the initial signature fails, so a bad key stops startup.
    /// Later failures keep the previous JWT and are logged.
    pub fn start<S>(
        signer: S,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Result<Self, JwtError>
    where
        S: JwtSigner + 'static,
    {
        let initial = signer.sign(Utc::now())?;
        let current = Arc::new(RwLock::new(initial));

        tokio::spawn(refresh_loop(signer, period, current.clone(), shutdown));

        Ok(Self { current })
    }

    /// A refresher that always hands out `jwt`.
    pub fn fixed(jwt: AppJwt) -> Self {
        Self {
            current: Arc::new(RwLock::new(jwt)),
        }
    }

    /// Returns the JWT currently in force.
    pub async fn current(&self) -> AppJwt {
        self.current.read().await.clone()
    }
}

impl fmt::Debug for JwtRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtRefresher").finish_non_exhaustive()
    }
}

async fn refresh_loop<S: JwtSigner>(
    signer: S,
    period: Duration,
    current: Arc<RwLock<AppJwt>>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; the initial JWT is already signed.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("JWT refresher shutting down");
                break;
            }
            _ = ticker.tick() => {
                match signer.sign(Utc::now()) {
                    Ok(jwt) => {
                        *current.write().await = jwt;
                        debug!("Refreshed App JWT");
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to refresh App JWT, keeping previous one");
                    }
                }
            }
        }
    }
}
