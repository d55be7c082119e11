//! Effect interpreter trait.
//!
//! The trait-based design lets the webhook pipeline run against the real API
//! in production and against a recording mock in tests.

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};
use crate::github::GitHubApiError;

/// Interprets GitHub effects against the GitHub API.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct AlwaysMissing;
///
/// impl GitHubInterpreter for AlwaysMissing {
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
///         match effect {
///             GitHubEffect::PostStatus { .. } => Ok(GitHubResponse::StatusPosted),
///             _ => Err(GitHubApiError::from_status(404, "missing", String::new())),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, GitHubApiError>> + Send;
}
