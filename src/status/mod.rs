//! Commit status payloads.
//!
//! Every handled event ends in at most one commit status on the pull request's
//! head commit, under the `PRLint` context. This module defines the payload and
//! the rules for turning a validation outcome (or a pipeline failure) into one.
//!
//! # Payload shapes
//!
//! | situation                    | state     | target                         |
//! |------------------------------|-----------|--------------------------------|
//! | all rules passed             | `success` | none                           |
//! | one failure                  | `failure` | the failure's details URL      |
//! | several failures             | `failure` | the rules file                 |
//! | lone failure is an error     | `failure` | the issue tracker              |
//! | no rules file (404)          | `success` | the app page                   |
//! | internal error               | `error`   | pre-filled issue form          |

pub mod format;

use serde::{Deserialize, Serialize};

pub use format::{
    DESCRIPTION_LIMIT, STATUS_CONTEXT, internal_error_status, no_configuration_status,
    outcome_status, truncate_description,
};

/// Commit status state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Failure,
    Error,
}

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub state: StatusState,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    pub context: String,
}
