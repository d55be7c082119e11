//! Process configuration, read from flags or the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::FalseyValueParser;
use thiserror::Error;

/// Errors turning [`Settings`] into usable values.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("one of PRIVATE_KEY or PRIVATE_KEY_PATH must be set")]
    MissingPrivateKey,

    #[error("failed to read private key from {path}: {source}")]
    ReadPrivateKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOKEN_EXPIRY_SKEW_SECS must not be negative, got {0}")]
    NegativeSkew(i64),

    #[error("JWT_REFRESH_SECS must be positive")]
    ZeroRefreshPeriod,
}

/// Command-line and environment settings for the PRLint server.
#[derive(Parser, Debug, Clone)]
#[command(name = "prlint")]
#[command(version, about = "Lints pull request metadata and reports a commit status", long_about = None)]
pub struct Settings {
    /// GitHub web root, used for links shown on statuses.
    #[arg(long, env = "GITHUB_URL", default_value = "https://github.com")]
    pub github_url: String,

    /// GitHub REST API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Log captured errors at info level instead of reporting them.
    #[arg(long, env = "DISABLE_RAVEN_LOG", value_parser = FalseyValueParser::new())]
    pub disable_raven_log: bool,

    /// GitHub App id, the `iss` claim of the App JWT.
    #[arg(long, env = "APP_ID")]
    pub app_id: String,

    /// PEM-encoded App private key.
    #[arg(
        long,
        env = "PRIVATE_KEY",
        hide_env_values = true,
        allow_hyphen_values = true,
        conflicts_with = "private_key_path"
    )]
    pub private_key: Option<String>,

    /// File containing the PEM-encoded App private key.
    #[arg(long, env = "PRIVATE_KEY_PATH")]
    pub private_key_path: Option<PathBuf>,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds before expiry at which a cached installation token is replaced.
    #[arg(long, env = "TOKEN_EXPIRY_SKEW_SECS", default_value_t = 60)]
    pub token_expiry_skew_secs: i64,

    /// Seconds between App JWT refreshes.
    #[arg(long, env = "JWT_REFRESH_SECS", default_value_t = 300)]
    pub jwt_refresh_secs: u64,
}

/// The two GitHub roots every URL is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUrls {
    pub web_url: String,
    pub api_url: String,
}

impl HostUrls {
    pub fn new(web_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            web_url: web_url.into().trim_end_matches('/').to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for HostUrls {
    fn default() -> Self {
        Self::new("https://github.com", "https://api.github.com")
    }
}

impl Settings {
    pub fn host_urls(&self) -> HostUrls {
        HostUrls::new(&self.github_url, &self.github_api_url)
    }

    /// Returns the App private key as PEM bytes.
    ///
    /// An inline key may carry literal `\n` sequences, as keys pasted into a
    /// single-line environment variable usually do.
    pub fn private_key_pem(&self) -> Result<Vec<u8>, SettingsError> {
        if let Some(inline) = &self.private_key {
            return Ok(inline.replace("\\n", "\n").into_bytes());
        }

        let path = self
            .private_key_path
            .as_ref()
            .ok_or(SettingsError::MissingPrivateKey)?;
        std::fs::read(path).map_err(|source| SettingsError::ReadPrivateKey {
            path: path.clone(),
            source,
        })
    }

    pub fn token_expiry_skew(&self) -> Result<chrono::Duration, SettingsError> {
        if self.token_expiry_skew_secs < 0 {
            return Err(SettingsError::NegativeSkew(self.token_expiry_skew_secs));
        }
        Ok(chrono::Duration::seconds(self.token_expiry_skew_secs))
    }

    pub fn jwt_refresh_period(&self) -> Result<Duration, SettingsError> {
        if self.jwt_refresh_secs == 0 {
            return Err(SettingsError::ZeroRefreshPeriod);
        }
        Ok(Duration::from_secs(self.jwt_refresh_secs))
    }
}
