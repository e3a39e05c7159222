//! Endpoint configuration for the ANAF services.
//!
//! Every component takes an [`AnafConfig`] (or one of its endpoint groups) in
//! its constructor. Defaults come from a [`Profile`]; a JSON file or the
//! environment may override individual URLs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::AnafError;

/// Default number of CUIs accepted in a single lookup batch.
pub const DEFAULT_LOOKUP_LIMIT: usize = 500;

const SYNC_URL: &str = "https://webservicesp.anaf.ro/api/PlatitorTvaRest/v8/tva";
const ASYNC_URL: &str = "https://webservicesp.anaf.ro/AsynchWebService/api/v8/ws/tva";
const API_URL_PROD: &str = "https://api.anaf.ro/prod/FCTEL/rest";
const API_URL_TEST: &str = "https://api.anaf.ro/test/FCTEL/rest";
const AUTH_URL: &str = "https://logincert.anaf.ro/anaf-oauth2/v1/authorize";
const TOKEN_URL: &str = "https://logincert.anaf.ro/anaf-oauth2/v1/token";

/// Which ANAF environment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Production,
    /// The e-Factura test environment; only the API base URL differs.
    Testing,
}

/// Taxpayer registry endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupEndpoints {
    pub sync_url: String,
    pub async_url: String,
}

impl Default for LookupEndpoints {
    fn default() -> Self {
        Self {
            sync_url: SYNC_URL.to_string(),
            async_url: ASYNC_URL.to_string(),
        }
    }
}

/// e-Factura API and OAuth2 endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfacturaEndpoints {
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
}

impl EfacturaEndpoints {
    pub fn for_profile(profile: Profile) -> Self {
        let api_url = match profile {
            Profile::Production => API_URL_PROD,
            Profile::Testing => API_URL_TEST,
        };
        Self {
            api_url: api_url.to_string(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }
}

impl Default for EfacturaEndpoints {
    fn default() -> Self {
        Self::for_profile(Profile::Production)
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnafConfig {
    pub profile: Profile,
    pub lookup: LookupEndpoints,
    pub efactura: EfacturaEndpoints,
    /// Maximum number of CUIs per lookup batch.
    pub lookup_limit: usize,
}

/// On-disk shape: every key optional, missing ones fall back to the profile.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    profile: Profile,
    lookup: Option<LookupEndpoints>,
    efactura: Option<RawEfactura>,
    lookup_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEfactura {
    api_url: Option<String>,
    auth_url: Option<String>,
    token_url: Option<String>,
}

impl AnafConfig {
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            profile,
            lookup: LookupEndpoints::default(),
            efactura: EfacturaEndpoints::for_profile(profile),
            lookup_limit: DEFAULT_LOOKUP_LIMIT,
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, AnafError> {
        let raw: RawConfig = serde_json::from_str(json)
            .map_err(|e| AnafError::Config(format!("invalid JSON: {e}")))?;
        let mut config = Self::for_profile(raw.profile);
        if let Some(lookup) = raw.lookup {
            config.lookup = lookup;
        }
        if let Some(efactura) = raw.efactura {
            if let Some(url) = efactura.api_url {
                config.efactura.api_url = url;
            }
            if let Some(url) = efactura.auth_url {
                config.efactura.auth_url = url;
            }
            if let Some(url) = efactura.token_url {
                config.efactura.token_url = url;
            }
        }
        if let Some(limit) = raw.lookup_limit {
            if limit == 0 {
                return Err(AnafError::Config("lookup_limit must be positive".into()));
            }
            config.lookup_limit = limit;
        }
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AnafError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnafError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Build from the process environment.
    ///
    /// `ANAF_TESTING` selects the testing profile; `ANAF_API_URL`,
    /// `ANAF_AUTH_URL`, `ANAF_TOKEN_URL`, `ANAF_SYNC_URL` and `ANAF_ASYNC_URL`
    /// override single endpoints.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let testing = var("ANAF_TESTING")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let profile = if testing {
            Profile::Testing
        } else {
            Profile::Production
        };
        let mut config = Self::for_profile(profile);
        config.apply_overrides(var);
        config
    }

    /// Apply `ANAF_*_URL` overrides on top of an existing configuration.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let targets: [(&str, &mut String); 5] = [
            ("ANAF_API_URL", &mut self.efactura.api_url),
            ("ANAF_AUTH_URL", &mut self.efactura.auth_url),
            ("ANAF_TOKEN_URL", &mut self.efactura.token_url),
            ("ANAF_SYNC_URL", &mut self.lookup.sync_url),
            ("ANAF_ASYNC_URL", &mut self.lookup.async_url),
        ];
        for (key, slot) in targets {
            if let Some(value) = var(key).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }
}

impl Default for AnafConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Production)
    }
}
