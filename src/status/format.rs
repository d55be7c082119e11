//! Status payload construction.

use super::{StatusPayload, StatusState};
use crate::rules::{FailureMessage, ValidationOutcome};

/// Status context shown on the pull request.
pub const STATUS_CONTEXT: &str = "PRLint";

/// GitHub rejects status descriptions longer than this many characters.
pub const DESCRIPTION_LIMIT: usize = 140;

const PASSED_DESCRIPTION: &str = "Your validation rules passed";

const NO_RULES_DESCRIPTION: &str = "No rules are setup for PRLint";

const INTERNAL_ERROR_DESCRIPTION: &str =
    "An error occurred with PRLint. Click details to open an issue";

const UNREPORTABLE_DESCRIPTION: &str =
    "Something went wrong with PRLint - You can help by opening an issue (click details)";

/// Where users are sent to report problems with PRLint itself.
pub const ISSUES_URL: &str = "https://github.com/VibrentHealth/prlint/issues/new";

/// Cuts `description` to at most [`DESCRIPTION_LIMIT`] characters.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_LIMIT).collect()
}

/// Builds the status for a completed validation.
///
/// With several failures only the first is described, prefixed with how many
/// others there are, and the link goes to the rules file instead of the first
/// rule's own URL.
pub fn outcome_status(outcome: &ValidationOutcome, default_url: &str) -> StatusPayload {
    let failures = outcome.failures();

    let Some(first) = failures.first() else {
        return payload(StatusState::Success, PASSED_DESCRIPTION.to_string(), None);
    };

    if failures.len() > 1 {
        let description = format!("1/{}: {}", failures.len() - 1, first.message);
        return payload(
            StatusState::Failure,
            truncate_description(&description),
            Some(default_url.to_string()),
        );
    }

    match &first.message {
        FailureMessage::Rule(text) => payload(
            StatusState::Failure,
            truncate_description(text),
            Some(first.details_url.clone()),
        ),
        FailureMessage::Error(_) => payload(
            StatusState::Failure,
            UNREPORTABLE_DESCRIPTION.to_string(),
            Some(ISSUES_URL.to_string()),
        ),
    }
}

/// Status for a repository without `.github/prlint.json`.
pub fn no_configuration_status(web_url: &str) -> StatusPayload {
    payload(
        StatusState::Success,
        NO_RULES_DESCRIPTION.to_string(),
        Some(format!("{}/apps/prlint", web_url.trim_end_matches('/'))),
    )
}

/// Status for an internal failure, linking to a pre-filled issue report.
pub fn internal_error_status(error: &str) -> StatusPayload {
    let target_url = format!(
        "{ISSUES_URL}?title={}&body={}",
        urlencoding::encode("Exception Report"),
        urlencoding::encode(error)
    );
    payload(
        StatusState::Error,
        INTERNAL_ERROR_DESCRIPTION.to_string(),
        Some(target_url),
    )
}

fn payload(state: StatusState, description: String, target_url: Option<String>) -> StatusPayload {
    StatusPayload {
        state,
        description,
        target_url,
        context: STATUS_CONTEXT.to_string(),
    }
}
