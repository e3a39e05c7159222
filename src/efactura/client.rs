use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use super::messages::{MessageList, PaginatedMessageList, UploadResponse};
use super::token::{OAuthCredential, TokenManager};
use crate::core::{AnafConfig, AnafError};
use crate::transport::{
    Body, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, build_url, check_status,
};

/// Number of days `listaMesajeFactura` looks back when the caller has no preference.
pub const DEFAULT_LIST_DAYS: u32 = 30;

/// Message filter accepted by the list endpoints (`filtru`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    /// E: invoice errors.
    Errors,
    /// P: invoices received.
    Received,
    /// T: invoices sent.
    Sent,
    /// R: buyer messages.
    BuyerMessages,
}

impl MessageFilter {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Errors => "E",
            Self::Received => "P",
            Self::Sent => "T",
            Self::BuyerMessages => "R",
        }
    }
}

impl FromStr for MessageFilter {
    type Err = AnafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "E" => Ok(Self::Errors),
            "P" => Ok(Self::Received),
            "T" => Ok(Self::Sent),
            "R" => Ok(Self::BuyerMessages),
            other => Err(AnafError::Validation(format!(
                "unknown message filter '{other}', expected one of E, P, T, R"
            ))),
        }
    }
}

/// Syntax of an uploaded document (`standard`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Standard {
    #[default]
    Ubl,
    /// UBL credit note.
    Cn,
    Cii,
    /// Buyer response message.
    Rasp,
}

impl Standard {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ubl => "UBL",
            Self::Cn => "CN",
            Self::Cii => "CII",
            Self::Rasp => "RASP",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Standard {
    type Err = AnafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UBL" => Ok(Self::Ubl),
            "CN" => Ok(Self::Cn),
            "CII" => Ok(Self::Cii),
            "RASP" => Ok(Self::Rasp),
            other => Err(AnafError::Validation(format!(
                "unknown standard '{other}', expected one of UBL, CN, CII, RASP"
            ))),
        }
    }
}

/// Optional upload flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Buyer is not a Romanian taxpayer.
    pub external: bool,
    /// Self-billed invoice (autofactura).
    pub self_invoice: bool,
}

/// e-Factura REST client.
///
/// Every call first makes sure the access token is usable (refreshing it if
/// needed), then performs exactly one request. 401/403 surface as
/// [`AnafError::Auth`]; there is no retry.
pub struct EinvoiceClient {
    api_url: String,
    tokens: TokenManager,
    transport: Arc<dyn HttpTransport>,
}

impl EinvoiceClient {
    /// Client over the blocking `reqwest` transport.
    pub fn new(config: &AnafConfig, credential: OAuthCredential) -> Result<Self, AnafError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(config, credential, Arc::new(transport)))
    }

    pub fn with_transport(
        config: &AnafConfig,
        credential: OAuthCredential,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let tokens = TokenManager::new(&config.efactura, credential, Arc::clone(&transport));
        Self {
            api_url: config.efactura.api_url.clone(),
            tokens,
            transport,
        }
    }

    pub fn set_api_url(&mut self, url: impl Into<String>) {
        self.api_url = url.into();
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut TokenManager {
        &mut self.tokens
    }

    /// Messages for `cif` from the last `days` days.
    pub fn list_messages(
        &mut self,
        cif: &str,
        days: u32,
        filter: Option<MessageFilter>,
    ) -> Result<MessageList, AnafError> {
        let mut params = vec![("cif", cif.to_string()), ("zile", days.to_string())];
        if let Some(f) = filter {
            params.push(("filtru", f.code().to_string()));
        }
        let url = build_url(&self.api_url, "listaMesajeFactura", &params)?;

        let response = self.send_authorized(HttpRequest::get(url))?;
        MessageList::from_json(&response.body)
    }

    /// One page of messages for `cif` between two epoch-millisecond instants.
    pub fn list_messages_paginated(
        &mut self,
        cif: &str,
        start_time: i64,
        end_time: i64,
        page: u32,
        filter: Option<MessageFilter>,
    ) -> Result<PaginatedMessageList, AnafError> {
        let mut params = vec![
            ("cif", cif.to_string()),
            ("startTime", start_time.to_string()),
            ("endTime", end_time.to_string()),
            ("pagina", page.to_string()),
        ];
        if let Some(f) = filter {
            params.push(("filtru", f.code().to_string()));
        }
        let url = build_url(&self.api_url, "listaMesajePaginatieFactura", &params)?;

        let response = self.send_authorized(HttpRequest::get(url))?;
        PaginatedMessageList::from_json(&response.body)
    }

    /// Upload an invoice document. The returned [`UploadResponse`] may still
    /// report a rejection through its `ExecutionStatus` and errors.
    pub fn upload_invoice(
        &mut self,
        xml: &str,
        standard: Standard,
        cif: &str,
        options: UploadOptions,
    ) -> Result<UploadResponse, AnafError> {
        let mut params = vec![("standard", standard.to_string()), ("cif", cif.to_string())];
        if options.external {
            params.push(("external", "DA".to_string()));
        }
        if options.self_invoice {
            params.push(("selfInvoice", "DA".to_string()));
        }
        let url = build_url(&self.api_url, "upload", &params)?;

        let request = HttpRequest::post(url, Body::Text(xml.to_string()))
            .header("Content-Type", "text/plain");
        let response = self.send_authorized(request)?;
        let upload = UploadResponse::from_xml(&response.body)?;
        info!(
            index = upload.upload_index().unwrap_or("-"),
            status = upload.execution_status().unwrap_or("-"),
            "invoice uploaded"
        );
        Ok(upload)
    }

    fn send_authorized(&mut self, request: HttpRequest) -> Result<HttpResponse, AnafError> {
        self.tokens.ensure_valid()?;
        let token = self
            .tokens
            .access_token()
            .ok_or_else(|| AnafError::Auth("no access token".into()))?;

        debug!(method = %request.method, url = %request.url, "calling e-Factura");
        // TODO: refresh and retry once on 401/403
        let response = self.transport.execute(request.bearer(token))?;
        check_status(response)
    }
}

impl fmt::Debug for EinvoiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EinvoiceClient")
            .field("api_url", &self.api_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_codes_roundtrip() {
        for f in [
            MessageFilter::Errors,
            MessageFilter::Received,
            MessageFilter::Sent,
            MessageFilter::BuyerMessages,
        ] {
            assert_eq!(f.code().parse::<MessageFilter>().unwrap(), f);
        }
        assert!("X".parse::<MessageFilter>().is_err());
    }

    #[test]
    fn standard_parsing_is_case_insensitive() {
        assert_eq!("ubl".parse::<Standard>().unwrap(), Standard::Ubl);
        assert_eq!("RASP".parse::<Standard>().unwrap(), Standard::Rasp);
        assert!("PDF".parse::<Standard>().is_err());
        assert_eq!(Standard::default().to_string(), "UBL");
    }
}
