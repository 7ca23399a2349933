use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::info;
use verdict_core::{CoreError, RedditCredentials, ServiceError};

pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are treated as expired this long before Reddit says they are.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated { token: RedditToken },
    TokenExpired { token: RedditToken },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
    error: Option<String>,
}

impl TokenResponse {
    fn into_token(self, issued_at: SystemTime) -> Result<RedditToken, ServiceError> {
        if let Some(error) = self.error {
            return Err(auth_failed(error));
        }
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| auth_failed("token response without access_token"))?;

        Ok(RedditToken {
            access_token,
            expires_at: issued_at + Duration::from_secs(self.expires_in.unwrap_or(3600)),
            scope: self
                .scope
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        })
    }
}

fn auth_failed(reason: impl Into<String>) -> ServiceError {
    ServiceError::AuthenticationFailed {
        service: "reddit".to_string(),
        reason: reason.into(),
    }
}

/// Application-only OAuth2 (client credentials grant).
#[derive(Debug)]
pub struct AppOnlyAuthenticator {
    client_id: String,
    client_secret: String,
    token_url: String,
    state: AuthState,
}

impl AppOnlyAuthenticator {
    pub fn new(credentials: &RedditCredentials) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token_url: REDDIT_TOKEN_URL.to_string(),
            state: AuthState::NotAuthenticated,
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn get_auth_state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    pub fn set_token(&mut self, token: RedditToken) {
        self.state = if token.is_expired() {
            AuthState::TokenExpired { token }
        } else {
            AuthState::Authenticated { token }
        };
    }

    /// The cached bearer token, if one is held and still valid.
    pub fn current_token(&self) -> Option<String> {
        match &self.state {
            AuthState::Authenticated { token } if !token.is_expired() => {
                Some(token.access_token.clone())
            }
            _ => None,
        }
    }

    /// Requests a fresh token. The caller stores it with [`Self::set_token`].
    pub async fn request_token(&self, transport: &Transport) -> Result<RedditToken, CoreError> {
        let request = transport
            .http()
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")]);

        let issued_at = SystemTime::now();
        let response = transport.send("/api/v1/access_token", request).await?;
        let body: TokenResponse = transport.decode("/api/v1/access_token", response).await?;
        let token = body.into_token(issued_at)?;

        info!("Obtained app-only Reddit token");
        Ok(token)
    }
}
