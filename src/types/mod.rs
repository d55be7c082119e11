//! Core domain types for PRLint.
//!
//! Identifiers are newtypes; the webhook payload is parsed into a typed event
//! carrying just the fields the lint pipeline needs.

pub mod event;
pub mod ids;

pub use event::{Branch, ConfigLocation, Installation, PullRequest, PullRequestEvent, Repository};
pub use ids::{InstallationId, RepoFullName, Sha};
