//! The lint pipeline for one pull request event.
//!
//! Stages run in order: fetch the rules file, evaluate it against the
//! flattened pull request, then post the resulting status to the PR's
//! `statuses_url`. A failure to fetch the rules short-circuits to a single
//! fallback status posted against the head commit, which either says the
//! repository has no rules (404) or that PRLint itself failed.
//!
//! Rules files that exist but do not decode, and patterns that do not compile,
//! are not pipeline failures. They become validation failures and are posted
//! like any other outcome.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::AccessToken;
use crate::config::HostUrls;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::flatten::FlattenedPullRequest;
use crate::github::GitHubApiError;
use crate::rules::{ConfigError, RuleSet, ValidationOutcome, decode_contents, evaluate};
use crate::status::{StatusPayload, internal_error_status, no_configuration_status, outcome_status};
use crate::telemetry::ErrorReporter;
use crate::types::PullRequestEvent;

/// How a lint run ended.
#[derive(Debug)]
pub enum LintOutcome {
    /// The status was posted.
    Reported(StatusPayload),

    /// Posting a status failed, whether it reported validation or stood in
    /// for a rules file that could not be fetched.
    StatusPostFailed {
        payload: StatusPayload,
        error: GitHubApiError,
    },

    /// The repository has no rules file. A success status was posted in its
    /// place.
    NotConfigured(GitHubApiError),

    /// The rules file could not be fetched. An error status was posted in its
    /// place.
    Failed(GitHubApiError),
}

/// Everything the pipeline needs besides the event itself.
pub struct LintContext<'a, H> {
    pub host: &'a H,
    pub urls: &'a HostUrls,
    pub reporter: &'a dyn ErrorReporter,
}

impl<H> Clone for LintContext<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for LintContext<'_, H> {}

/// Lints one pull request and reports the result on its head commit.
///
/// `pull_request` is the raw `pull_request` object from the delivery. Every
/// leaf in it is addressable by rules, not only the fields in
/// [`PullRequestEvent`].
#[instrument(
    skip_all,
    fields(
        repo = %event.repository.full_name,
        installation_id = %event.installation_id(),
        head_sha = %event.pull_request.head.sha.short(),
    )
)]
pub async fn lint_pull_request<H: GitHubInterpreter>(
    ctx: LintContext<'_, H>,
    event: &PullRequestEvent,
    pull_request: &Value,
    token: &AccessToken,
) -> LintOutcome {
    let default_url = event.default_details_url(&ctx.urls.web_url);

    let rules = match fetch_rules(ctx.host, event, token).await {
        Ok(rules) => rules,
        Err(error) => return post_fallback_status(ctx, event, token, error).await,
    };

    let outcome = match rules {
        Ok(rules) => evaluate(&rules, &FlattenedPullRequest::from_value(pull_request), &default_url),
        Err(error) => {
            warn!(error = %error, "Rules file is malformed");
            ValidationOutcome::misconfigured(&error, &default_url)
        }
    };
    let payload = outcome_status(&outcome, &default_url);

    info!(
        state = ?payload.state,
        failures = outcome.len(),
        "Validated pull request"
    );

    let effect = GitHubEffect::PostStatus {
        url: event.pull_request.statuses_url.clone(),
        token: token.clone(),
        payload: payload.clone(),
    };
    match ctx.host.interpret(effect).await {
        Ok(_) => LintOutcome::Reported(payload),
        Err(error) => {
            warn!(error = %error, "Failed to post status");
            ctx.reporter
                .capture(&error.to_string(), serde_json::to_value(&payload).ok().as_ref());
            LintOutcome::StatusPostFailed { payload, error }
        }
    }
}

/// Fetches and decodes the rules file.
///
/// The outer error is a failed request. The inner one is a file that was
/// fetched but is not a valid rule set.
async fn fetch_rules<H: GitHubInterpreter>(
    host: &H,
    event: &PullRequestEvent,
    token: &AccessToken,
) -> Result<Result<RuleSet, ConfigError>, GitHubApiError> {
    let location = event.config_location();
    debug!(repo = %location.repo, git_ref = %location.git_ref, "Fetching rules file");

    let effect = GitHubEffect::FetchConfig {
        repo: location.repo,
        git_ref: location.git_ref,
        token: token.clone(),
    };
    match host.interpret(effect).await? {
        GitHubResponse::ConfigContents(body) => Ok(decode_contents(&body)),
        other => Err(unexpected_response("fetch_config", &other)),
    }
}

async fn post_fallback_status<H: GitHubInterpreter>(
    ctx: LintContext<'_, H>,
    event: &PullRequestEvent,
    token: &AccessToken,
    error: GitHubApiError,
) -> LintOutcome {
    let (payload, outcome) = if error.is_not_found() {
        info!("No rules file, reporting success");
        (
            no_configuration_status(&ctx.urls.web_url),
            LintOutcome::NotConfigured(error),
        )
    } else {
        warn!(error = %error, "Failed to fetch rules file");
        let message = error.to_string();
        ctx.reporter.capture(&message, None);
        (internal_error_status(&message), LintOutcome::Failed(error))
    };

    let effect = GitHubEffect::PostStatus {
        url: event.fallback_statuses_url(&ctx.urls.api_url),
        token: token.clone(),
        payload: payload.clone(),
    };
    match ctx.host.interpret(effect).await {
        Ok(_) => outcome,
        Err(post_error) => {
            warn!(error = %post_error, "Failed to post fallback status");
            ctx.reporter
                .capture(&post_error.to_string(), serde_json::to_value(&payload).ok().as_ref());
            LintOutcome::StatusPostFailed {
                payload,
                error: post_error,
            }
        }
    }
}

pub(crate) fn unexpected_response(effect: &str, response: &GitHubResponse) -> GitHubApiError {
    GitHubApiError::transport_without_source(format!(
        "unexpected response to {effect}: {response:?}"
    ))
}
