//! Effects-as-data for GitHub operations.
//!
//! The lint pipeline describes each outbound call as a [`GitHubEffect`] and
//! hands it to a [`GitHubInterpreter`]. This enables:
//! - Testability via mock interpreters that record every call
//! - Uniform logging of intended operations
//! - Keeping HTTP details out of the dispatch and reporting logic

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse};
pub use interpreter::GitHubInterpreter;
