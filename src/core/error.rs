use std::fmt;

use thiserror::Error;

/// Errors surfaced by every ANAF operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnafError {
    /// Bad input shape: missing invoice fields, invalid CUI, batch limit exceeded.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Token missing, expired beyond refresh, or rejected by the server.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Non-200 response or transport failure.
    #[error("remote error: {0}")]
    Remote(RemoteCause),

    /// Malformed server response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unreadable or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// XML generation failure.
    #[error("XML error: {0}")]
    Xml(String),
}

impl AnafError {
    /// HTTP status carried by a [`AnafError::Remote`] error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote(RemoteCause::Status(code)) => Some(*code),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Why a remote call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCause {
    /// The server answered with a non-200 status.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
}

impl fmt::Display for RemoteCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(cause) => write!(f, "transport failure: {cause}"),
        }
    }
}

/// A single validation finding with the path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "seller.cui").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collapse a list of findings into a single [`AnafError::Validation`].
pub(crate) fn join_validation_errors(errors: &[ValidationError]) -> AnafError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    AnafError::Validation(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_for_remote_status() {
        assert_eq!(AnafError::Remote(RemoteCause::Status(500)).status(), Some(500));
        assert_eq!(
            AnafError::Remote(RemoteCause::Transport("refused".into())).status(),
            None
        );
        assert_eq!(AnafError::Auth("Unauthorized".into()).status(), None);
    }

    #[test]
    fn display_formats() {
        let err = AnafError::Remote(RemoteCause::Status(503));
        assert_eq!(err.to_string(), "remote error: HTTP 503");
        let v = ValidationError::new("seller.cui", "must not be empty");
        assert_eq!(v.to_string(), "seller.cui: must not be empty");
    }

    #[test]
    fn joined_validation_message() {
        let err = join_validation_errors(&[
            ValidationError::new("a", "x"),
            ValidationError::new("b", "y"),
        ]);
        assert_eq!(err.to_string(), "validation failed: a: x; b: y");
    }
}
