//! Typed records for e-Factura API responses.

use std::collections::BTreeMap;
use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::AnafError;

/// Page size the server uses when it does not report one.
pub const DEFAULT_PAGE_LIMIT: u32 = 500;

/// Kind of an e-Factura message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// Invoice accepted and sent ("FACTURA TRIMISA").
    Accepted,
    /// Invoice rejected with errors ("ERORI FACTURA").
    Error,
    /// Any other server-defined type, kept verbatim.
    Other(String),
}

impl MessageType {
    pub const ACCEPTED: &'static str = "FACTURA TRIMISA";
    pub const ERROR: &'static str = "ERORI FACTURA";

    pub fn from_raw(raw: &str) -> Self {
        match raw {
            Self::ACCEPTED => Self::Accepted,
            Self::ERROR => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => Self::ACCEPTED,
            Self::Error => Self::ERROR,
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

/// One entry of the e-Factura message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EinvoiceMessage {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "tip")]
    pub message_type: MessageType,
    /// Creation timestamp as sent by the server (`YYYYMMDDHHmm`).
    #[serde(rename = "data_creare", deserialize_with = "string_or_number")]
    pub created_at: String,
    /// Fiscal code of the issuer.
    #[serde(deserialize_with = "string_or_number")]
    pub cif: String,
    /// Upload index of the originating request.
    #[serde(rename = "id_solicitare", deserialize_with = "string_or_number")]
    pub request_id: String,
    #[serde(rename = "detalii", default)]
    pub details: String,
}

/// Response of `listaMesajeFactura`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    #[serde(rename = "titlu")]
    pub title: String,
    /// Set by the server instead of messages (e.g. nothing in the interval).
    #[serde(rename = "eroare", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub cui: Option<String>,
    #[serde(rename = "mesaje", default)]
    pub messages: Vec<EinvoiceMessage>,
}

/// Response of `listaMesajePaginatieFactura`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedMessageList {
    #[serde(rename = "titlu")]
    pub title: String,
    #[serde(rename = "eroare", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub cui: Option<String>,
    /// Messages on this page.
    #[serde(
        rename = "numar_inregistrari_in_pagina",
        alias = "numar_ingregistrari_in_pagina",
        default
    )]
    pub count_in_page: u32,
    /// Page size.
    #[serde(
        rename = "numar_total_inregistrari_per_pagina",
        default = "default_page_limit"
    )]
    pub limit: u32,
    /// Messages across all pages.
    #[serde(rename = "numar_total_inregistrari", default)]
    pub total_count: u32,
    #[serde(rename = "numar_total_pagini", default)]
    pub total_pages: u32,
    #[serde(rename = "index_pagina_curenta", default)]
    pub current_page: u32,
    #[serde(rename = "mesaje", default)]
    pub messages: Vec<EinvoiceMessage>,
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl MessageList {
    pub fn from_json(body: &str) -> Result<Self, AnafError> {
        serde_json::from_str(body)
            .map_err(|e| AnafError::Parse(format!("invalid message list: {e}")))
    }
}

impl PaginatedMessageList {
    pub fn from_json(body: &str) -> Result<Self, AnafError> {
        serde_json::from_str(body)
            .map_err(|e| AnafError::Parse(format!("invalid paginated message list: {e}")))
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Response of the `upload` endpoint.
///
/// The server answers with a single `header` element whose attributes carry
/// the outcome; rejected uploads add nested `Errors` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    /// Root attributes, namespace declarations excluded.
    pub attributes: BTreeMap<String, String>,
    /// `errorMessage` of each nested `Errors` element.
    pub errors: Vec<String>,
}

impl UploadResponse {
    pub fn from_xml(xml: &str) -> Result<Self, AnafError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut response: Option<UploadResponse> = None;
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if let Some(resp) = response.as_mut() {
                        if e.local_name().as_ref() == b"Errors" {
                            if let Some(msg) = attribute(e, "errorMessage")? {
                                resp.errors.push(msg);
                            }
                        }
                    } else {
                        response = Some(Self::from_root(e)?);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(AnafError::Parse(format!(
                        "invalid upload response at position {}: {e}",
                        reader.error_position()
                    )));
                }
            }
        }

        response.ok_or_else(|| AnafError::Parse("upload response has no root element".into()))
    }

    fn from_root(root: &BytesStart<'_>) -> Result<Self, AnafError> {
        let mut attributes = BTreeMap::new();
        for attr in root.attributes() {
            let attr = attr.map_err(|e| AnafError::Parse(format!("invalid attribute: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| AnafError::Parse(e.to_string()))?;
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr
                .unescape_value()
                .map_err(|e| AnafError::Parse(e.to_string()))?;
            attributes.insert(key.to_string(), value.into_owned());
        }
        Ok(Self {
            attributes,
            errors: Vec::new(),
        })
    }

    /// Upload index (`index_incarcare`) used to track processing.
    pub fn upload_index(&self) -> Option<&str> {
        self.attribute("index_incarcare")
    }

    /// `ExecutionStatus`: "0" accepted for processing, "1" rejected.
    pub fn execution_status(&self) -> Option<&str> {
        self.attribute("ExecutionStatus")
    }

    /// Server timestamp (`dateResponse`, `YYYYMMDDHHmm`).
    pub fn date_response(&self) -> Option<&str> {
        self.attribute("dateResponse")
    }

    pub fn is_accepted(&self) -> bool {
        self.execution_status() == Some("0") && self.errors.is_empty()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, AnafError> {
    match element.try_get_attribute(name) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|e| AnafError::Parse(e.to_string())),
        Ok(None) => Ok(None),
        Err(e) => Err(AnafError::Parse(format!("invalid attribute: {e}"))),
    }
}
