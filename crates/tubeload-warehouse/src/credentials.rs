//! Google service-account authentication.
//!
//! Signs a short-lived RS256 assertion with the account's private key and
//! exchanges it at the key's `token_uri` for an OAuth access token
//! (the JWT bearer grant). Tokens are cached until shortly before expiry.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::WarehouseError;

/// OAuth scope for BigQuery reads and writes.
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the server-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account key file that token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key_id: String,
    pub private_key: String,
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[redacted]")
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read a key file downloaded from the cloud console.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::CredentialsIo`] if the file cannot be read,
    /// or [`WarehouseError::Credentials`] if it is not a service-account key.
    pub fn from_file(path: &Path) -> Result<Self, WarehouseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| WarehouseError::CredentialsIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// # Errors
    ///
    /// Returns [`WarehouseError::Credentials`] if `raw` is malformed or not of
    /// type `service_account`.
    pub fn from_json(raw: &str) -> Result<Self, WarehouseError> {
        let key: Self =
            serde_json::from_str(raw).map_err(|e| WarehouseError::Credentials(e.to_string()))?;
        if key.key_type != "service_account" {
            return Err(WarehouseError::Credentials(format!(
                "expected type \"service_account\", got \"{}\"",
                key.key_type
            )));
        }
        Ok(key)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Access-token source for one service account.
pub struct ServiceAccountAuth {
    client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// # Errors
    ///
    /// Returns [`WarehouseError::Jwt`] if the private key is not a valid RSA
    /// PEM, or [`WarehouseError::Http`] if the client cannot be built.
    pub fn new(key: ServiceAccountKey, scope: &str, timeout_secs: u64) -> Result<Self, WarehouseError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            key,
            encoding_key,
            scope: scope.to_string(),
            cached: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn signed_assertion(&self) -> Result<String, WarehouseError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.private_key_id.clone());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    /// A bearer token, from cache when still fresh.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::TokenExchange`] if the token endpoint
    /// rejects the assertion, or any signing or transport error.
    pub async fn access_token(&self) -> Result<String, WarehouseError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let assertion = self.signed_assertion()?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WarehouseError::TokenExchange {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|source| WarehouseError::Deserialize {
                context: "token response".to_string(),
                source,
            })?;

        let lifetime = Duration::from_secs(parsed.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(
            account = %self.key.client_email,
            expires_in = parsed.expires_in,
            "obtained access token"
        );

        *cached = Some(CachedToken {
            token: parsed.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(parsed.access_token)
    }
}
