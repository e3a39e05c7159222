//! Shared fixtures: a scripted HTTP server and JWT helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anaf::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct FakeServer {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeServer {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no canned response left".into())))
    }
}

#[cfg(feature = "client")]
pub mod jwt {
    use jsonwebtoken::{EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    /// HS256 token expiring at `exp` (unix seconds), signed with a key the
    /// client never sees.
    pub fn token(exp: i64) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: "8000000000".into(),
                exp,
            },
            &EncodingKey::from_secret(b"anaf-signing-key"),
        )
        .unwrap()
    }

    pub fn valid() -> String {
        token(chrono::Utc::now().timestamp() + 3600)
    }

    pub fn expired() -> String {
        token(chrono::Utc::now().timestamp() - 3600)
    }

    pub fn token_response(access: &str, refresh: &str) -> String {
        serde_json::json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "Bearer",
            "expires_in": 7_776_000,
        })
        .to_string()
    }
}
