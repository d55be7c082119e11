//! Shared test fixtures: webhook payloads, contents API bodies, and a
//! recording GitHub interpreter.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use crate::auth::{AccessToken, InstallationToken};
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::GitHubApiError;
use crate::status::StatusPayload;
use crate::telemetry::ErrorReporter;
use crate::types::InstallationId;

/// Builder for a `pull_request` webhook body.
#[derive(Debug, Clone)]
pub struct PullRequestPayload {
    action: String,
    title: String,
    merge_commit_sha: Option<String>,
    head_repo: String,
    fork: bool,
    installation_id: u64,
}

impl PullRequestPayload {
    pub const REPO: &'static str = "octocat/hello-world";
    pub const HEAD_SHA: &'static str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";
    pub const BASE_SHA: &'static str = "e5bd3914e2e596debea16f433f57875b5b90bcd6";
    pub const STATUSES_URL: &'static str = "https://api.github.com/repos/octocat/hello-world/statuses/6dcb09b5b57875f334f61aebed695e2e4193db5e";
    pub const INSTALLATION_ID: u64 = 4242;

    pub fn new() -> Self {
        Self {
            action: "opened".to_string(),
            title: "Update the README with new information".to_string(),
            merge_commit_sha: Some("e5bd3914e2e596debea16f433f57875b5b90bcd6".to_string()),
            head_repo: Self::REPO.to_string(),
            fork: false,
            installation_id: Self::INSTALLATION_ID,
        }
    }

    pub fn action(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn merge_commit_sha(mut self, sha: Option<&str>) -> Self {
        self.merge_commit_sha = sha.map(str::to_string);
        self
    }

    /// Makes the head branch live in a fork called `head_repo`.
    pub fn fork(mut self, head_repo: &str) -> Self {
        self.head_repo = head_repo.to_string();
        self.fork = true;
        self
    }

    pub fn installation_id(mut self, id: u64) -> Self {
        self.installation_id = id;
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "action": self.action,
            "number": 1347,
            "pull_request": {
                "url": "https://api.github.com/repos/octocat/hello-world/pulls/1347",
                "number": 1347,
                "state": "open",
                "title": self.title,
                "body": "Please pull these awesome changes",
                "draft": false,
                "user": { "login": "octocat", "id": 1 },
                "labels": [{ "name": "docs", "color": "f29513" }],
                "statuses_url": Self::STATUSES_URL,
                "merge_commit_sha": self.merge_commit_sha,
                "head": {
                    "ref": "feature/readme",
                    "sha": Self::HEAD_SHA,
                    "repo": { "full_name": self.head_repo, "fork": self.fork }
                },
                "base": {
                    "ref": "main",
                    "sha": Self::BASE_SHA,
                    "repo": { "full_name": Self::REPO, "fork": false }
                }
            },
            "repository": { "full_name": Self::REPO, "fork": false },
            "installation": { "id": self.installation_id }
        })
    }
}

impl Default for PullRequestPayload {
    fn default() -> Self {
        Self::new()
    }
}

/// A contents API response body carrying `rules_json` as the file content.
pub fn contents_response(rules_json: &str) -> String {
    json!({
        "type": "file",
        "encoding": "base64",
        "path": ".github/prlint.json",
        "content": format!("{}\n", STANDARD.encode(rules_json)),
    })
    .to_string()
}

/// An installation token good for another hour.
pub fn fresh_token(installation_id: u64, value: &str) -> InstallationToken {
    InstallationToken {
        installation_id: InstallationId(installation_id),
        token: AccessToken::new(value),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// An installation token that expired a minute ago.
pub fn expired_token(installation_id: u64, value: &str) -> InstallationToken {
    InstallationToken {
        installation_id: InstallationId(installation_id),
        token: AccessToken::new(value),
        expires_at: Utc::now() - Duration::minutes(1),
    }
}

type Scripted = VecDeque<Result<GitHubResponse, GitHubApiError>>;

#[derive(Default)]
struct MockState {
    effects: Vec<GitHubEffect>,
    config: Scripted,
    mint: Scripted,
    status: Scripted,
}

/// Interpreter that records every effect and answers from per-kind scripts.
///
/// Unscripted status posts succeed. Unscripted config fetches and token mints
/// fail with a transport error.
#[derive(Clone, Default)]
pub struct MockGitHub {
    state: Arc<Mutex<MockState>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_ok(&self, body: String) {
        self.lock().config.push_back(Ok(GitHubResponse::ConfigContents(body)));
    }

    pub fn config_err(&self, error: GitHubApiError) {
        self.lock().config.push_back(Err(error));
    }

    pub fn mint_ok(&self, token: InstallationToken) {
        self.lock()
            .mint
            .push_back(Ok(GitHubResponse::InstallationToken(token)));
    }

    pub fn mint_err(&self, error: GitHubApiError) {
        self.lock().mint.push_back(Err(error));
    }

    pub fn status_err(&self, error: GitHubApiError) {
        self.lock().status.push_back(Err(error));
    }

    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.lock().effects.clone()
    }

    /// `(url, payload)` of every status post, in order.
    pub fn posted_statuses(&self) -> Vec<(String, StatusPayload)> {
        self.lock()
            .effects
            .iter()
            .filter_map(|effect| match effect {
                GitHubEffect::PostStatus { url, payload, .. } => Some((url.clone(), payload.clone())),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

impl GitHubInterpreter for MockGitHub {
    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        let mut state = self.lock();
        state.effects.push(effect.clone());

        let scripted = match &effect {
            GitHubEffect::FetchConfig { .. } => state.config.pop_front(),
            GitHubEffect::MintInstallationToken { .. } => state.mint.pop_front(),
            GitHubEffect::PostStatus { .. } => state.status.pop_front(),
        };

        scripted.unwrap_or_else(|| match effect {
            GitHubEffect::PostStatus { .. } => Ok(GitHubResponse::StatusPosted),
            other => Err(GitHubApiError::transport_without_source(format!(
                "no scripted response for {}",
                other.name()
            ))),
        })
    }
}

/// Error reporter that keeps every capture.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    captured: Arc<Mutex<Vec<(String, Option<Value>)>>>,
}

impl RecordingReporter {
    pub fn captured(&self) -> Vec<(String, Option<Value>)> {
        self.captured.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn capture(&self, error: &str, context: Option<&Value>) {
        self.captured
            .lock()
            .unwrap()
            .push((error.to_string(), context.cloned()));
    }
}
