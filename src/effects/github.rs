//! GitHub API effect types.
//!
//! These types describe the three outbound calls PRLint makes, without
//! executing them. Credentials travel inside the effect because each call
//! authenticates differently.

use crate::auth::{AccessToken, AppJwt, InstallationToken};
use crate::status::StatusPayload;
use crate::types::{InstallationId, RepoFullName};

/// A GitHub API effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEffect {
    /// Read `.github/prlint.json` through the contents API.
    FetchConfig {
        repo: RepoFullName,
        git_ref: String,
        token: AccessToken,
    },

    /// Exchange the App JWT for an installation access token.
    MintInstallationToken {
        installation_id: InstallationId,
        jwt: AppJwt,
    },

    /// Create a commit status at an absolute statuses URL.
    PostStatus {
        url: String,
        token: AccessToken,
        payload: StatusPayload,
    },
}

impl GitHubEffect {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::FetchConfig { .. } => "fetch_config",
            GitHubEffect::MintInstallationToken { .. } => "mint_installation_token",
            GitHubEffect::PostStatus { .. } => "post_status",
        }
    }
}

/// Response from a GitHub effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubResponse {
    /// Response to `FetchConfig`: the raw contents API body, still encoded.
    ConfigContents(String),

    /// Response to `MintInstallationToken`.
    InstallationToken(InstallationToken),

    /// Response to `PostStatus`.
    StatusPosted,
}
