//! OAuth2 authorization-code and refresh grants against the ANAF identity
//! provider.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{AnafError, EfacturaEndpoints};
use crate::transport::{Body, HttpRequest, HttpTransport, build_url};

/// Token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime of the access token in seconds, when reported.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Client registration used for the authorization-code flow.
pub struct OAuthClient {
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    transport: Arc<dyn HttpTransport>,
}

impl OAuthClient {
    pub fn new(
        endpoints: &EfacturaEndpoints,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            auth_url: endpoints.auth_url.clone(),
            token_url: endpoints.token_url.clone(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            transport,
        }
    }

    pub fn set_auth_url(&mut self, url: impl Into<String>) {
        self.auth_url = url.into();
    }

    pub fn set_token_url(&mut self, url: impl Into<String>) {
        self.token_url = url.into();
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// URL the user opens in a browser (with their certificate) to obtain
    /// an authorization code.
    pub fn authorize_url(&self) -> Result<String, AnafError> {
        build_url(
            &self.auth_url,
            "",
            &[
                ("client_id", self.client_id.clone()),
                ("client_secret", self.client_secret.clone()),
                ("response_type", "code".to_string()),
                ("redirect_uri", self.redirect_uri.clone()),
            ],
        )
    }

    /// Exchange an authorization code for a token pair.
    pub fn exchange_code(&self, code: &str) -> Result<TokenResponse, AnafError> {
        if code.trim().is_empty() {
            return Err(AnafError::Auth("authorization code is empty".into()));
        }
        let tokens = self.token_grant("authorization_code", ("code", code), "getting token")?;
        info!("obtained access token from authorization code");
        Ok(tokens)
    }

    /// Obtain a fresh token pair from a refresh token.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AnafError> {
        let tokens = self.token_grant(
            "refresh_token",
            ("refresh_token", refresh_token),
            "refreshing token",
        )?;
        info!("refreshed access token");
        Ok(tokens)
    }

    fn token_grant(
        &self,
        grant_type: &str,
        credential: (&str, &str),
        action: &str,
    ) -> Result<TokenResponse, AnafError> {
        let form = vec![
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
            ("grant_type".to_string(), grant_type.to_string()),
            (credential.0.to_string(), credential.1.to_string()),
            ("redirect_uri".to_string(), self.redirect_uri.clone()),
        ];
        let request = HttpRequest::post(&self.token_url, Body::Form(form));

        let response = self
            .transport
            .execute(request)
            .map_err(|e| AnafError::Auth(format!("error {action}: {e}")))?;
        if response.status != 200 {
            return Err(AnafError::Auth(format!(
                "error {action}: HTTP {}",
                response.status
            )));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| AnafError::Parse(format!("invalid token response: {e}")))
    }
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}
