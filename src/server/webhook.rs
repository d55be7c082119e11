//! Webhook endpoint handler.
//!
//! GitHub delivers every event the App subscribes to here. Deliveries without
//! a pull request, and closed pull requests, are echoed back untouched. Open
//! pull requests are linted synchronously: the response is only sent once the
//! commit status has been posted (or has failed to post).

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::auth::{AccessToken, InstallationToken};
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::flatten::is_truthy;
use crate::github::GitHubApiError;
use crate::pipeline::{LintContext, LintOutcome, lint_pull_request, unexpected_response};
use crate::types::{InstallationId, PullRequestEvent};

/// Body sent with every 400.
const INVALID_PAYLOAD: &str = "invalid request payload";

/// Errors that end a webhook delivery before linting starts.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The body is not JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// A pull request delivery without a usable installation id, or a body
    /// that is not an object at all.
    #[error("delivery has no installation to act as")]
    MissingInstallation,

    /// The pull request lacks a field the pipeline reads.
    #[error("malformed pull request payload: {0}")]
    MalformedPullRequest(#[source] serde_json::Error),

    /// No installation token could be obtained.
    #[error("{source}")]
    TokenMint {
        /// Whatever was cached for the installation, expired or not.
        stale: Option<InstallationToken>,
        #[source]
        source: GitHubApiError,
    },
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::InvalidJson(_)
            | WebhookError::MissingInstallation
            | WebhookError::MalformedPullRequest(_) => {
                (StatusCode::BAD_REQUEST, INVALID_PAYLOAD).into_response()
            }
            WebhookError::TokenMint { stale, source } => {
                // The stale entry is summarised. Its secret is never echoed.
                let token = stale.map(|t| {
                    json!({
                        "installation_id": t.installation_id,
                        "expires_at": t.expires_at,
                    })
                });
                let body = json!({
                    "token": token,
                    "exception": source.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl IntoResponse for LintOutcome {
    fn into_response(self) -> Response {
        match self {
            LintOutcome::Reported(payload) => (StatusCode::OK, Json(payload)).into_response(),
            LintOutcome::StatusPostFailed { payload, error } => {
                let body = json!({
                    "exception": error.to_string(),
                    "request_body": payload,
                    "response": error.body,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            LintOutcome::NotConfigured(error) => (StatusCode::OK, error.to_string()).into_response(),
            LintOutcome::Failed(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
            }
        }
    }
}

/// What to do with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Answer 200 with the delivery itself.
    Echo(&'static str),
    /// Lint the pull request as this installation.
    Lint(InstallationId),
    /// Answer 400.
    Reject,
}

/// Decides how to handle a delivery. The first matching case wins.
///
/// 1. No `pull_request` (or a falsy one): echo.
/// 2. `action` is `closed`: echo.
/// 3. A non-zero `installation.id`: lint.
/// 4. Anything else: reject.
pub fn classify(body: &Value) -> Dispatch {
    if !is_truthy(body) {
        return Dispatch::Reject;
    }
    if !body.get("pull_request").is_some_and(is_truthy) {
        return Dispatch::Echo("no pull request");
    }
    if body.get("action").and_then(Value::as_str) == Some("closed") {
        return Dispatch::Echo("pull request closed");
    }
    match body.pointer("/installation/id").and_then(Value::as_u64) {
        Some(id) if id != 0 => Dispatch::Lint(InstallationId(id)),
        _ => Dispatch::Reject,
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 with the delivery echoed: nothing to lint
/// - 200 with the posted status: linted
/// - 200 with a message: the repository has no rules file
/// - 400 `invalid request payload`: unusable delivery
/// - 500: token mint, rules fetch, or status post failed
pub async fn webhook_handler<H>(
    State(app_state): State<AppState<H>>,
    body: Bytes,
) -> Result<Response, WebhookError>
where
    H: GitHubInterpreter + Send + Sync + 'static,
{
    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Webhook body is not JSON");
        WebhookError::InvalidJson(e)
    })?;

    let installation_id = match classify(&body) {
        Dispatch::Echo(reason) => {
            debug!(reason, "Echoing webhook");
            return Ok((StatusCode::OK, Json(body)).into_response());
        }
        Dispatch::Reject => {
            debug!("Rejecting webhook without an installation");
            return Err(WebhookError::MissingInstallation);
        }
        Dispatch::Lint(id) => id,
    };

    let event: PullRequestEvent = serde_json::from_value(body.clone()).map_err(|e| {
        warn!(installation_id = %installation_id, error = %e, "Malformed pull request payload");
        WebhookError::MalformedPullRequest(e)
    })?;

    let token = installation_token(&app_state, installation_id).await?;

    let ctx = LintContext {
        host: app_state.host(),
        urls: app_state.urls(),
        reporter: app_state.reporter(),
    };
    let outcome = lint_pull_request(ctx, &event, &body["pull_request"], &token).await;

    Ok(outcome.into_response())
}

/// Returns a usable access token for the installation, minting and caching
/// a new one when the cached token is missing or about to expire.
async fn installation_token<H>(
    app_state: &AppState<H>,
    installation_id: InstallationId,
) -> Result<AccessToken, WebhookError>
where
    H: GitHubInterpreter + Send + Sync + 'static,
{
    let cached = app_state.tokens().get(installation_id);
    if let Some(entry) = &cached
        && entry.is_usable_at(Utc::now(), app_state.token_expiry_skew())
    {
        debug!(installation_id = %installation_id, "Using cached installation token");
        return Ok(entry.token.clone());
    }

    let jwt = app_state.jwt().current().await;
    let effect = GitHubEffect::MintInstallationToken {
        installation_id,
        jwt,
    };
    let minted = match app_state.host().interpret(effect).await {
        Ok(GitHubResponse::InstallationToken(token)) => Ok(token),
        Ok(other) => Err(unexpected_response("mint_installation_token", &other)),
        Err(e) => Err(e),
    };

    match minted {
        Ok(token) => {
            info!(
                installation_id = %installation_id,
                expires_at = %token.expires_at,
                "Minted installation token"
            );
            let access = token.token.clone();
            app_state.tokens().set(installation_id, token);
            Ok(access)
        }
        Err(source) => {
            warn!(installation_id = %installation_id, error = %source, "Failed to mint installation token");
            app_state.reporter().capture(&source.to_string(), None);
            Err(WebhookError::TokenMint {
                stale: cached,
                source,
            })
        }
    }
}
