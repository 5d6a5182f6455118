use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::error::GoogleApiError;

pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Supplies OAuth bearer tokens for Google APIs.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, GoogleApiError>;
}

/// Fixed token, for tests and locally minted credentials.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, GoogleApiError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parses the service account JSON as pasted into an environment
    /// variable. Hosting dashboards sometimes escape newlines or swap quote
    /// styles, so those forms are accepted as a fallback.
    pub fn parse(raw: &str) -> Result<Self, GoogleApiError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GoogleApiError::Credentials("service account JSON is empty".to_string()));
        }

        serde_json::from_str::<Self>(raw)
            .or_else(|_| serde_json::from_str::<Self>(&raw.replace("\\n", "\n")))
            .or_else(|_| serde_json::from_str::<Self>(&raw.replace('\'', "\"")))
            .map_err(|e| GoogleApiError::Credentials(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges a signed service-account assertion for an access token and
/// reuses it until shortly before it expires.
pub struct ServiceAccountTokenProvider {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(client: Client, raw_json: &str, scopes: &[&str]) -> Result<Self, GoogleApiError> {
        let key = ServiceAccountKey::parse(raw_json)?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| GoogleApiError::Credentials(format!("private key: {}", e)))?;

        info!("Using service account: {}", key.client_email);

        Ok(Self {
            client,
            key,
            encoding_key,
            scope: scopes.join(" "),
            cached: RwLock::new(None),
        })
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, GoogleApiError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| GoogleApiError::Auth(format!("failed to sign assertion: {}", e)))
    }

    async fn fetch_token(&self) -> Result<CachedToken, GoogleApiError> {
        let now = Utc::now();
        let assertion = self.signed_assertion(now)?;

        debug!("Requesting access token from {}", self.key.token_uri);

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Token exchange failed ({}): {}", status, body);
            return Err(GoogleApiError::Auth(format!("token exchange failed ({}): {}", status, body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, GoogleApiError> {
        let refresh_margin = Duration::seconds(60);

        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at - refresh_margin > Utc::now() {
                return Ok(cached.token.clone());
            }
        }

        let mut slot = self.cached.write().await;
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at - refresh_margin > Utc::now() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }
}
