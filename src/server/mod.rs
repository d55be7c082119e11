//! HTTP server for PRLint.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries and lints pull requests
//! - `GET /status` - Returns 200 "OK" if the server is running
//! - `GET /version` - Returns the short git SHA of the build
//! - `/favicon.ico` - Empty icon
//! - anything else - 301 to the project page

use std::sync::Arc;

use axum::routing::{any, get, post};
use tower_http::trace::TraceLayer;

use crate::auth::{JwtRefresher, TokenCache};
use crate::config::HostUrls;
use crate::effects::GitHubInterpreter;
use crate::telemetry::ErrorReporter;

pub mod health;
pub mod webhook;

pub use health::{
    REPOSITORY_URL, favicon_handler, redirect_handler, status_handler, version_handler,
};
pub use webhook::{Dispatch, WebhookError, classify, webhook_handler};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. `H` executes
/// the outbound GitHub calls.
pub struct AppState<H> {
    inner: Arc<AppStateInner<H>>,
}

struct AppStateInner<H> {
    host: H,

    urls: HostUrls,

    /// Installation tokens, shared by all requests.
    tokens: Arc<dyn TokenCache>,

    /// Source of the App JWT used to mint installation tokens.
    jwt: JwtRefresher,

    reporter: Arc<dyn ErrorReporter>,

    /// Cached tokens expiring within this window are replaced.
    token_expiry_skew: chrono::Duration,
}

impl<H> Clone for AppState<H> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> AppState<H> {
    pub fn new(
        host: H,
        urls: HostUrls,
        tokens: Arc<dyn TokenCache>,
        jwt: JwtRefresher,
        reporter: Arc<dyn ErrorReporter>,
        token_expiry_skew: chrono::Duration,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                host,
                urls,
                tokens,
                jwt,
                reporter,
                token_expiry_skew,
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn urls(&self) -> &HostUrls {
        &self.inner.urls
    }

    pub fn tokens(&self) -> &dyn TokenCache {
        self.inner.tokens.as_ref()
    }

    pub fn jwt(&self) -> &JwtRefresher {
        &self.inner.jwt
    }

    pub fn reporter(&self) -> &dyn ErrorReporter {
        self.inner.reporter.as_ref()
    }

    pub fn token_expiry_skew(&self) -> chrono::Duration {
        self.inner.token_expiry_skew
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<H>(app_state: AppState<H>) -> axum::Router
where
    H: GitHubInterpreter + Send + Sync + 'static,
{
    axum::Router::new()
        .route(
            "/webhook",
            post(webhook_handler::<H>).fallback(redirect_handler),
        )
        .route("/status", get(status_handler).fallback(redirect_handler))
        .route("/version", get(version_handler).fallback(redirect_handler))
        .route("/favicon.ico", any(favicon_handler))
        .fallback(redirect_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
