//! Single request/response HTTP exchange used by every remote operation.
//!
//! Components talk to ANAF through the [`HttpTransport`] trait so that the
//! response classification and parsing can be driven by a fake server in
//! tests. [`ReqwestTransport`] is the blocking production implementation.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::core::{AnafError, RemoteCause};

const USER_AGENT: &str = concat!("anaf/", env!("CARGO_PKG_VERSION"));

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `application/x-www-form-urlencoded` key/value pairs.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
    /// Raw text sent as `text/plain`.
    Text(String),
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Fully built URL, query string included.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Body) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any response (DNS, TLS, connection reset, timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// Executes one request and returns the raw response, whatever its status.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(Body::Form(pairs)) => builder.form(&pairs),
            Some(Body::Json(value)) => builder.json(&value),
            Some(Body::Text(text)) => builder.body(text),
            None => builder,
        };

        let resp = builder.send().map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| TransportError(e.to_string()))?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}

impl From<TransportError> for AnafError {
    fn from(e: TransportError) -> Self {
        AnafError::Remote(RemoteCause::Transport(e.0))
    }
}

/// Join `base` and `path` and append `params` as an encoded query string.
pub(crate) fn build_url(
    base: &str,
    path: &str,
    params: &[(&str, String)],
) -> Result<String, AnafError> {
    let joined = if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    };
    let parsed = if params.is_empty() {
        reqwest::Url::parse(&joined)
    } else {
        reqwest::Url::parse_with_params(&joined, params)
    };
    let url = parsed.map_err(|e| AnafError::Config(format!("invalid URL '{joined}': {e}")))?;
    Ok(url.into())
}

/// Classify a response: only 200 is success; 401/403 are authorization failures.
pub(crate) fn check_status(response: HttpResponse) -> Result<HttpResponse, AnafError> {
    match response.status {
        200 => Ok(response),
        401 | 403 => Err(AnafError::Auth("Unauthorized".into())),
        status => Err(AnafError::Remote(RemoteCause::Status(status))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_added() {
        let req = HttpRequest::get("https://example.test").bearer("abc");
        assert_eq!(req.header_value("authorization"), Some("Bearer abc"));
        assert_eq!(req.method, Method::Get);
        assert!(req.body.is_none());
    }

    #[test]
    fn status_classification() {
        assert!(check_status(HttpResponse::new(200, "")).is_ok());
        assert!(check_status(HttpResponse::new(401, "")).unwrap_err().is_auth());
        assert!(check_status(HttpResponse::new(403, "")).unwrap_err().is_auth());
        assert_eq!(
            check_status(HttpResponse::new(500, "")).unwrap_err().status(),
            Some(500)
        );
        assert_eq!(
            check_status(HttpResponse::new(204, "")).unwrap_err().status(),
            Some(204)
        );
    }

    #[test]
    fn url_params_are_encoded() {
        let url = build_url(
            "https://api.example.test/rest/",
            "upload",
            &[("standard", "UBL".into()), ("cif", "RO 123".into())],
        )
        .unwrap();
        assert_eq!(url, "https://api.example.test/rest/upload?standard=UBL&cif=RO+123");
    }

    #[test]
    fn bad_base_url_is_config_error() {
        assert!(matches!(
            build_url("not a url", "x", &[]),
            Err(AnafError::Config(_))
        ));
    }

    #[test]
    fn method_display() {
        assert_eq!(Method::Post.to_string(), "POST");
    }
}
