//! Access-token lifecycle: validity from the token's `exp` claim, refresh,
//! and the authorization-code exchange.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::auth::{OAuthClient, TokenResponse};
use crate::core::{AnafError, EfacturaEndpoints};
use crate::transport::HttpTransport;

/// Client registration plus the current token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl OAuthCredential {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            access_token: None,
            refresh_token: None,
        }
    }

    pub fn with_tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.access_token = Some(access_token.into());
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Expiry decoded from the access token, if it carries a readable `exp`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.access_token
            .as_deref()
            .and_then(|t| decode_expiry(t).ok())
    }
}

/// Where the access token stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    NoToken,
    Valid,
    /// Past its expiry, or unreadable.
    Expired,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Read the `exp` claim without verifying the signature; ANAF signs the
/// token and this side only needs its lifetime.
fn decode_expiry(token: &str) -> Result<DateTime<Utc>, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let data = jsonwebtoken::decode::<ExpiryClaim>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|e| e.to_string())?;

    DateTime::from_timestamp(data.claims.exp, 0)
        .ok_or_else(|| format!("exp claim out of range: {}", data.claims.exp))
}

/// Owns the credential and keeps its access token usable.
///
/// Not meant to be shared between threads without external locking: a
/// refresh replaces the token pair in place.
#[derive(Debug)]
pub struct TokenManager {
    credential: OAuthCredential,
    oauth: OAuthClient,
}

impl TokenManager {
    pub fn new(
        endpoints: &EfacturaEndpoints,
        credential: OAuthCredential,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let oauth = OAuthClient::new(
            endpoints,
            credential.client_id.clone(),
            credential.client_secret.clone(),
            credential.redirect_uri.clone(),
            transport,
        );
        Self { credential, oauth }
    }

    pub fn credential(&self) -> &OAuthCredential {
        &self.credential
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credential.access_token.as_deref()
    }

    pub fn state(&self) -> TokenState {
        self.state_at(Utc::now())
    }

    /// Token state evaluated at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        let Some(token) = self.credential.access_token.as_deref() else {
            return TokenState::NoToken;
        };
        match decode_expiry(token) {
            Ok(exp) if now < exp => TokenState::Valid,
            Ok(exp) => {
                warn!(expired_at = %exp, "access token expired");
                TokenState::Expired
            }
            Err(e) => {
                error!(error = %e, "invalid access token");
                TokenState::Expired
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state() == TokenState::Valid
    }

    /// Refresh using the stored refresh token.
    pub fn refresh(&mut self) -> Result<&OAuthCredential, AnafError> {
        let refresh_token = self
            .credential
            .refresh_token
            .clone()
            .ok_or_else(|| AnafError::Auth("no refresh token available".into()))?;
        self.refresh_with(&refresh_token)
    }

    /// Refresh with an explicit refresh token. On success both tokens are
    /// replaced together; on failure the credential is left untouched.
    pub fn refresh_with(&mut self, refresh_token: &str) -> Result<&OAuthCredential, AnafError> {
        let tokens = self.oauth.refresh(refresh_token)?;
        self.install(tokens);
        Ok(&self.credential)
    }

    /// Exchange an authorization code and install the resulting token pair.
    pub fn authorize(&mut self, code: &str) -> Result<&OAuthCredential, AnafError> {
        let tokens = self.oauth.exchange_code(code)?;
        self.install(tokens);
        Ok(&self.credential)
    }

    /// Refresh unless the current access token is valid.
    pub fn ensure_valid(&mut self) -> Result<(), AnafError> {
        match self.state() {
            TokenState::Valid => Ok(()),
            TokenState::NoToken | TokenState::Expired => self.refresh().map(|_| ()),
        }
    }

    fn install(&mut self, tokens: TokenResponse) {
        self.credential.access_token = Some(tokens.access_token);
        self.credential.refresh_token = Some(tokens.refresh_token);
    }
}
