//! PRLint - a GitHub App that lints pull request metadata.
//!
//! Repositories opt in with a `.github/prlint.json` file mapping pull request
//! fields to regex rules. On every pull request event the rules are evaluated
//! and the result is posted as a commit status on the head commit.

pub mod auth;
pub mod config;
pub mod effects;
pub mod flatten;
pub mod github;
pub mod pipeline;
pub mod rules;
pub mod server;
pub mod status;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;
