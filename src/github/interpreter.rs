//! GitHub effect interpreter using octocrab.
//!
//! Requests go through octocrab's raw `_get`/`_post` so that the status code
//! is inspected here: a 404 on the rules file must stay distinguishable from
//! every other failure. No retries and no timeouts are applied.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::auth::{AccessToken, AppJwt, InstallationToken};
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::rules::CONFIG_FILE_PATH;
use crate::status::StatusPayload;
use crate::types::{InstallationId, RepoFullName};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// Body of a successful `POST /app/installations/{id}/access_tokens`.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Executes effects against the GitHub REST API.
#[derive(Debug, Clone)]
pub struct OctocrabInterpreter {
    api_base: String,
}

impl OctocrabInterpreter {
    /// Creates an interpreter for the API at `api_base`
    /// (`https://api.github.com` or a GitHub Enterprise equivalent).
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

impl GitHubInterpreter for OctocrabInterpreter {
    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        debug!(effect = effect.name(), "Executing GitHub effect");
        match effect {
            GitHubEffect::FetchConfig {
                repo,
                git_ref,
                token,
            } => self.fetch_config(&repo, &git_ref, &token).await,
            GitHubEffect::MintInstallationToken {
                installation_id,
                jwt,
            } => self.mint_installation_token(installation_id, &jwt).await,
            GitHubEffect::PostStatus {
                url,
                token,
                payload,
            } => self.post_status(&url, &token, &payload).await,
        }
    }
}

impl OctocrabInterpreter {
    #[instrument(skip(self, token), fields(repo = %repo))]
    async fn fetch_config(
        &self,
        repo: &RepoFullName,
        git_ref: &str,
        token: &AccessToken,
    ) -> Result<GitHubResponse, GitHubApiError> {
        let client = OctocrabClient::for_installation(&self.api_base, token)
            .map_err(|e| GitHubApiError::transport("failed to build GitHub client", e))?;
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.api_base,
            repo,
            CONFIG_FILE_PATH,
            urlencoding::encode(git_ref)
        );

        let response = client
            .inner()
            ._get(url)
            .await
            .map_err(|e| GitHubApiError::transport("failed to fetch rules file", e))?;
        let status = response.status();
        let body = client
            .inner()
            .body_to_string(response)
            .await
            .map_err(|e| GitHubApiError::transport("failed to read rules file response", e))?;

        if !status.is_success() {
            return Err(GitHubApiError::from_status(
                status.as_u16(),
                format!("fetching {CONFIG_FILE_PATH} from {repo}"),
                body,
            ));
        }

        Ok(GitHubResponse::ConfigContents(body))
    }

    #[instrument(skip(self, jwt), fields(installation_id = %installation_id))]
    async fn mint_installation_token(
        &self,
        installation_id: InstallationId,
        jwt: &AppJwt,
    ) -> Result<GitHubResponse, GitHubApiError> {
        let client = OctocrabClient::for_app(&self.api_base, jwt)
            .map_err(|e| GitHubApiError::transport("failed to build GitHub client", e))?;
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base, installation_id
        );

        let response = client
            .inner()
            ._post(url, None::<&()>)
            .await
            .map_err(|e| GitHubApiError::transport("failed to mint installation token", e))?;
        let status = response.status();
        let body = client
            .inner()
            .body_to_string(response)
            .await
            .map_err(|e| GitHubApiError::transport("failed to read token response", e))?;

        if !status.is_success() {
            return Err(GitHubApiError::from_status(
                status.as_u16(),
                format!("minting token for installation {installation_id}"),
                body,
            ));
        }

        let parsed: AccessTokenResponse = serde_json::from_str(&body).map_err(|e| {
            GitHubApiError::decode(
                status.as_u16(),
                format!("unexpected token response: {e}"),
                body.clone(),
            )
        })?;

        Ok(GitHubResponse::InstallationToken(InstallationToken {
            installation_id,
            token: AccessToken::new(parsed.token),
            expires_at: parsed.expires_at,
        }))
    }

    #[instrument(skip(self, token, payload), fields(state = ?payload.state))]
    async fn post_status(
        &self,
        url: &str,
        token: &AccessToken,
        payload: &StatusPayload,
    ) -> Result<GitHubResponse, GitHubApiError> {
        let client = OctocrabClient::for_installation(&self.api_base, token)
            .map_err(|e| GitHubApiError::transport("failed to build GitHub client", e))?;

        let response = client
            .inner()
            ._post(url.to_string(), Some(payload))
            .await
            .map_err(|e| GitHubApiError::transport("failed to post commit status", e))?;
        let status = response.status();

        if !status.is_success() {
            let body = client
                .inner()
                .body_to_string(response)
                .await
                .unwrap_or_default();
            return Err(GitHubApiError::from_status(
                status.as_u16(),
                "posting commit status",
                body,
            ));
        }

        Ok(GitHubResponse::StatusPosted)
    }
}
