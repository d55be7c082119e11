//! Small endpoints around the webhook: uptime check, build version, favicon,
//! and the redirect every unknown path gets.

use axum::http::StatusCode;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::response::IntoResponse;

/// Where unknown paths are sent.
pub const REPOSITORY_URL: &str = "https://github.com/VibrentHealth/prlint";

/// Uptime check.
///
/// ```ignore
/// GET /status HTTP/1.1
///
/// HTTP/1.1 200 OK
///
/// OK
/// ```
pub async fn status_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Returns the short git SHA the binary was built from, or the package
/// version when the build had no git checkout.
pub async fn version_handler() -> &'static str {
    build_version()
}

pub fn build_version() -> &'static str {
    option_env!("PRLINT_GIT_SHA").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Browsers ask for this on every visit. Answered with an empty icon.
pub async fn favicon_handler() -> impl IntoResponse {
    (StatusCode::OK, [(CONTENT_TYPE, "image/x-icon")])
}

pub async fn redirect_handler() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(LOCATION, REPOSITORY_URL)])
}
