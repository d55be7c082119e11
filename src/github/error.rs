//! GitHub API error types.
//!
//! The lint pipeline only needs to tell a few failure classes apart:
//!
//! - **Not found** (HTTP 404): for the rules file this means the repository has
//!   not opted in, which is reported as a success rather than an error.
//! - **HTTP** errors: any other non-2xx answer.
//! - **Transport** errors: the request never produced a response.
//! - **Decode** errors: a 2xx answer whose body was not what the API documents.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// HTTP 404.
    NotFound,

    /// Any other non-success HTTP status.
    Http,

    /// Connection, TLS, or client construction failure.
    Transport,

    /// The response body could not be decoded.
    Decode,
}

/// A GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error.
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The response body, if one was received.
    pub body: Option<String>,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error from a non-success HTTP response.
    ///
    /// A 404 becomes [`GitHubErrorKind::NotFound`]; everything else is
    /// [`GitHubErrorKind::Http`].
    pub fn from_status(status_code: u16, message: impl Into<String>, body: String) -> Self {
        let kind = if status_code == 404 {
            GitHubErrorKind::NotFound
        } else {
            GitHubErrorKind::Http
        };
        Self {
            kind,
            status_code: Some(status_code),
            message: message.into(),
            body: Some(body),
            source: None,
        }
    }

    /// Creates a transport error from an octocrab error.
    pub fn transport(message: impl Into<String>, source: octocrab::Error) -> Self {
        Self {
            kind: GitHubErrorKind::Transport,
            status_code: None,
            message: format!("{}: {}", message.into(), source),
            body: None,
            source: Some(source),
        }
    }

    /// Creates a transport error without an octocrab source.
    pub fn transport_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transport,
            status_code: None,
            message: message.into(),
            body: None,
            source: None,
        }
    }

    /// Creates a decode error for a response whose body was unusable.
    pub fn decode(status_code: u16, message: impl Into<String>, body: String) -> Self {
        Self {
            kind: GitHubErrorKind::Decode,
            status_code: Some(status_code),
            message: message.into(),
            body: Some(body),
            source: None,
        }
    }

    /// Returns true if GitHub answered 404.
    pub fn is_not_found(&self) -> bool {
        self.kind == GitHubErrorKind::NotFound
    }
}
