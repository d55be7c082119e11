//! GitHub API client and effect interpreter.
//!
//! This module provides the production implementation of the
//! `GitHubInterpreter` trait defined in the effects module, built on octocrab.

mod client;
mod error;
mod interpreter;

pub use client::{OctocrabClient, PREVIEW_ACCEPT};
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::OctocrabInterpreter;
