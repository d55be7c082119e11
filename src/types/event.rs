//! Typed view of the `pull_request` webhook payload.
//!
//! Only the fields the lint pipeline reads are modelled here. Everything else in
//! the payload is reached through the flattened representation instead.

use serde::Deserialize;

use super::ids::{InstallationId, RepoFullName, Sha};
use crate::rules::CONFIG_FILE_PATH;

/// A `pull_request` webhook delivery, reduced to what linting needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub pull_request: PullRequest,
    pub repository: Repository,
    pub installation: Installation,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    /// Absolute API URL for posting commit statuses against the head commit.
    pub statuses_url: String,
    #[serde(default)]
    pub merge_commit_sha: Option<Sha>,
    pub head: Branch,
    pub base: Branch,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: Sha,
    pub repo: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub full_name: RepoFullName,
    #[serde(default)]
    pub fork: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Installation {
    pub id: InstallationId,
}

/// Where the rules file is read from: a repository and a git ref within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub repo: RepoFullName,
    pub git_ref: String,
}

impl PullRequestEvent {
    /// Returns the repository and ref to read `.github/prlint.json` from.
    ///
    /// Normally this is the head repository at the merge commit (or the head
    /// branch when GitHub has not computed a merge commit yet). Installation
    /// tokens cannot read a fork's contents, so for forks the base repository
    /// is queried at the head SHA instead.
    pub fn config_location(&self) -> ConfigLocation {
        let pr = &self.pull_request;

        if pr.head.repo.fork {
            return ConfigLocation {
                repo: pr.base.repo.full_name.clone(),
                git_ref: pr.head.sha.to_string(),
            };
        }

        let git_ref = pr
            .merge_commit_sha
            .as_ref()
            .filter(|sha| !sha.as_str().is_empty())
            .map(|sha| sha.to_string())
            .unwrap_or_else(|| pr.head.git_ref.clone());

        ConfigLocation {
            repo: pr.head.repo.full_name.clone(),
            git_ref,
        }
    }

    /// Web URL of the rules file at the head commit, used as the details link
    /// whenever a failure has no more specific URL.
    pub fn default_details_url(&self, web_url: &str) -> String {
        let head = &self.pull_request.head;
        format!(
            "{}/{}/blob/{}/{}",
            web_url.trim_end_matches('/'),
            head.repo.full_name,
            head.sha,
            CONFIG_FILE_PATH
        )
    }

    /// API URL for statuses on the head commit, built from the event's
    /// repository rather than the PR's own `statuses_url`.
    pub fn fallback_statuses_url(&self, api_url: &str) -> String {
        format!(
            "{}/repos/{}/statuses/{}",
            api_url.trim_end_matches('/'),
            self.repository.full_name,
            self.pull_request.head.sha
        )
    }

    pub fn installation_id(&self) -> InstallationId {
        self.installation.id
    }
}
