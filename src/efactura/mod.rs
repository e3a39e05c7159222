//! e-Factura: OAuth2 token lifecycle and the message/upload API.
//!
//! # Example
//!
//! ```no_run
//! use anaf::core::AnafConfig;
//! use anaf::efactura::{EinvoiceClient, OAuthCredential, DEFAULT_LIST_DAYS};
//!
//! let credential = OAuthCredential::new("client-id", "client-secret", "http://localhost:8080")
//!     .with_tokens("access-token", "refresh-token");
//! let mut client = EinvoiceClient::new(&AnafConfig::from_env(), credential).unwrap();
//! let list = client.list_messages("8000000000", DEFAULT_LIST_DAYS, None).unwrap();
//! println!("{} messages", list.messages.len());
//! ```

mod auth;
mod client;
mod messages;
mod token;

pub use auth::{OAuthClient, TokenResponse};
pub use client::{
    DEFAULT_LIST_DAYS, EinvoiceClient, MessageFilter, Standard, UploadOptions,
};
pub use messages::{
    DEFAULT_PAGE_LIMIT, EinvoiceMessage, MessageList, MessageType, PaginatedMessageList,
    UploadResponse,
};
pub use token::{OAuthCredential, TokenManager, TokenState};
