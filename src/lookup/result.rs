use serde::{Deserialize, Serialize};

use crate::core::{AnafError, RemoteCause};

/// VAT-registry status of one taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxpayerStatus {
    pub cui: u64,
    /// Date the status was evaluated at, as returned by the registry.
    pub date: String,
    pub name: String,
    pub address: String,
    /// Not flagged as inactive.
    pub is_active: bool,
    /// Registered for VAT purposes.
    pub vat_eligible: bool,
    /// Applies split VAT.
    pub vat_split_eligible: bool,
    /// Applies VAT on collection (TVA la incasare).
    pub vat_collection_eligible: bool,
}

/// Outcome of a registry query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub found: Vec<TaxpayerStatus>,
    pub not_found: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    cod: Option<i64>,
    message: Option<String>,
    #[serde(default)]
    found: Vec<RawEntry>,
    #[serde(default, rename = "notFound")]
    not_found: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    date_generale: GeneralData,
    #[serde(rename = "inregistrare_scop_Tva")]
    vat_registration: VatRegistration,
    #[serde(rename = "inregistrare_RTVAI")]
    vat_on_collection: VatOnCollection,
    stare_inactiv: InactiveState,
    #[serde(rename = "inregistrare_SplitTVA")]
    split_vat: SplitVat,
}

#[derive(Debug, Deserialize)]
struct GeneralData {
    cui: u64,
    data: String,
    denumire: String,
    #[serde(default)]
    adresa: String,
}

#[derive(Debug, Deserialize)]
struct VatRegistration {
    #[serde(rename = "scpTVA")]
    scp_tva: bool,
}

#[derive(Debug, Deserialize)]
struct VatOnCollection {
    #[serde(rename = "statusTvaIncasare")]
    status: bool,
}

#[derive(Debug, Deserialize)]
struct InactiveState {
    #[serde(rename = "statusInactivi")]
    status: bool,
}

#[derive(Debug, Deserialize)]
struct SplitVat {
    #[serde(rename = "statusSplitTVA")]
    status: bool,
}

impl From<RawEntry> for TaxpayerStatus {
    fn from(raw: RawEntry) -> Self {
        Self {
            cui: raw.date_generale.cui,
            date: raw.date_generale.data,
            name: raw.date_generale.denumire,
            address: raw.date_generale.adresa,
            is_active: !raw.stare_inactiv.status,
            vat_eligible: raw.vat_registration.scp_tva,
            vat_split_eligible: raw.split_vat.status,
            vat_collection_eligible: raw.vat_on_collection.status,
        }
    }
}

impl LookupResult {
    /// Parse a registry response body.
    ///
    /// A `cod` other than 200 inside a 200 response is reported as a remote
    /// error with that code.
    pub fn from_json(body: &str) -> Result<Self, AnafError> {
        let raw: RawResponse = serde_json::from_str(body)
            .map_err(|e| AnafError::Parse(format!("invalid lookup response: {e}")))?;

        if let Some(cod) = raw.cod.filter(|&c| c != 200) {
            let status = u16::try_from(cod).map_err(|_| {
                AnafError::Parse(format!(
                    "unexpected response code {cod}: {}",
                    raw.message.as_deref().unwrap_or("")
                ))
            })?;
            return Err(AnafError::Remote(RemoteCause::Status(status)));
        }

        let not_found = raw
            .not_found
            .iter()
            .map(not_found_cui)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            found: raw.found.into_iter().map(TaxpayerStatus::from).collect(),
            not_found,
        })
    }
}

// Older API versions list bare numbers, newer ones objects with a `cui` key.
fn not_found_cui(value: &serde_json::Value) -> Result<u64, AnafError> {
    value
        .as_u64()
        .or_else(|| value.get("cui").and_then(serde_json::Value::as_u64))
        .ok_or_else(|| AnafError::Parse(format!("invalid notFound entry: {value}")))
}

/// Acknowledgement of an asynchronous lookup submission.
#[derive(Debug, Deserialize)]
pub(crate) struct AsyncSubmission {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
}

impl AsyncSubmission {
    pub(crate) fn from_json(body: &str) -> Result<Self, AnafError> {
        serde_json::from_str(body)
            .map_err(|e| AnafError::Parse(format!("invalid async submission response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_accepts_both_shapes() {
        let result =
            LookupResult::from_json(r#"{"cod":200,"found":[],"notFound":[12,{"cui":34}]}"#)
                .unwrap();
        assert_eq!(result.not_found, vec![12, 34]);
        assert!(result.found.is_empty());
    }

    #[test]
    fn non_200_code_is_remote_error() {
        let err = LookupResult::from_json(r#"{"cod":404,"message":"not found"}"#).unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn async_correlation_id() {
        let sub = AsyncSubmission::from_json(r#"{"cod":200,"correlationId":"abc-1"}"#).unwrap();
        assert_eq!(sub.correlation_id, "abc-1");
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(matches!(
            LookupResult::from_json("<html>"),
            Err(AnafError::Parse(_))
        ));
    }
}
