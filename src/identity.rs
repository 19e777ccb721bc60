use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const PROFILE_URL: &str = "https://api.github.com/user";
const USER_AGENT: &str = "bountiful-api";

/// The part of the external profile the session keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub username: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider rejected the login: {0}")]
    Rejected(String),
}

/// IdentityProvider
///
/// The contract for the external OAuth login. The real implementation talks to GitHub;
/// the mock lets the callback flow run in tests without network access.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The consent-screen URL the browser is sent to. `state` is echoed back on the callback.
    fn authorize_url(&self, state: &str) -> Result<String, IdentityError>;

    /// Trades the callback `code` for the signed-in user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, IdentityError>;
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

/// GitHubClient
///
/// OAuth web-flow client for a GitHub OAuth app.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl GitHubClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            client_id: config.github_client_id.clone(),
            client_secret: config.github_client_secret.clone(),
            callback_url: config.github_callback_url.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

#[async_trait]
impl IdentityProvider for GitHubClient {
    fn authorize_url(&self, state: &str) -> Result<String, IdentityError> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| IdentityError::Rejected(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, IdentityError> {
        let token: TokenResponse = self
            .http
            .post(ACCESS_TOKEN_URL)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let access_token = match token {
            TokenResponse {
                access_token: Some(access_token),
                ..
            } => access_token,
            TokenResponse {
                error,
                error_description,
                ..
            } => {
                let reason = error_description
                    .or(error)
                    .unwrap_or_else(|| "no access token issued".to_string());
                return Err(IdentityError::Rejected(reason));
            }
        };

        let user: GitHubUser = self
            .http
            .get(PROFILE_URL)
            .bearer_auth(access_token)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ExternalProfile {
            username: user.login,
        })
    }
}

/// MockIdentityProvider
///
/// Accepts any code and signs in as `username`. Built with `new_failing`, every exchange
/// is rejected instead.
#[derive(Clone)]
pub struct MockIdentityProvider {
    pub username: Option<String>,
}

impl MockIdentityProvider {
    pub fn new(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
        }
    }

    pub fn new_failing() -> Self {
        Self { username: None }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn authorize_url(&self, state: &str) -> Result<String, IdentityError> {
        Ok(format!("https://github.example/login/oauth/authorize?state={state}"))
    }

    async fn exchange_code(&self, _code: &str) -> Result<ExternalProfile, IdentityError> {
        match &self.username {
            Some(username) => Ok(ExternalProfile {
                username: username.clone(),
            }),
            None => Err(IdentityError::Rejected(
                "Mock identity error: simulation requested".to_string(),
            )),
        }
    }
}
