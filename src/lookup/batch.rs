use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::result::{AsyncSubmission, LookupResult};
use crate::core::{AnafConfig, AnafError, LookupEndpoints};
use crate::transport::{Body, HttpRequest, HttpTransport, build_url, check_status};

/// Which registry endpoint a URL override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Sync,
    Async,
}

/// One CUI to look up and the date its status is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiscalLookupEntry {
    pub cui: u64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
}

/// A batch of CUIs for the VAT registry.
///
/// Each CUI appears once; adding it again replaces its date.
#[derive(Debug, Clone)]
pub struct FiscalLookup {
    endpoints: LookupEndpoints,
    limit: usize,
    cuis: BTreeMap<u64, NaiveDate>,
}

impl FiscalLookup {
    pub fn new(config: &AnafConfig) -> Self {
        Self::with_endpoints(config.lookup.clone(), config.lookup_limit)
    }

    pub fn with_endpoints(endpoints: LookupEndpoints, limit: usize) -> Self {
        Self {
            endpoints,
            limit,
            cuis: BTreeMap::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the batch limit. Fails if it is zero or below the current size.
    pub fn set_limit(&mut self, limit: usize) -> Result<(), AnafError> {
        if limit == 0 {
            return Err(AnafError::Validation("limit should be a positive integer".into()));
        }
        if self.cuis.len() > limit {
            return Err(AnafError::Validation(format!(
                "batch already holds {} CUIs, cannot lower limit to {limit}",
                self.cuis.len()
            )));
        }
        self.limit = limit;
        Ok(())
    }

    pub fn set_endpoint(&mut self, target: Target, url: impl Into<String>) {
        match target {
            Target::Sync => self.endpoints.sync_url = url.into(),
            Target::Async => self.endpoints.async_url = url.into(),
        }
    }

    pub fn endpoints(&self) -> &LookupEndpoints {
        &self.endpoints
    }

    /// Add a CUI, or replace the date of one already present.
    ///
    /// Adding a new CUI to a full batch fails and leaves the batch unchanged.
    pub fn add_cui(&mut self, cui: u64, date: NaiveDate) -> Result<(), AnafError> {
        if !self.cuis.contains_key(&cui) && self.cuis.len() >= self.limit {
            return Err(self.limit_exceeded());
        }
        self.cuis.insert(cui, date);
        Ok(())
    }

    /// Add every CUI in `cuis` with the same date.
    ///
    /// All-or-nothing: if the resulting batch would exceed the limit nothing
    /// is inserted.
    pub fn set_cui_list(&mut self, cuis: &[u64], date: NaiveDate) -> Result<(), AnafError> {
        let new = cuis
            .iter()
            .filter(|cui| !self.cuis.contains_key(*cui))
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        if cuis.len() > self.limit || self.cuis.len() + new > self.limit {
            return Err(self.limit_exceeded());
        }
        for &cui in cuis {
            self.cuis.insert(cui, date);
        }
        Ok(())
    }

    fn limit_exceeded(&self) -> AnafError {
        AnafError::Validation(format!(
            "too many CUIs to be queried, should limit to {}",
            self.limit
        ))
    }

    pub fn len(&self) -> usize {
        self.cuis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuis.is_empty()
    }

    pub fn clear(&mut self) {
        self.cuis.clear();
    }

    /// Date recorded for `cui`, if present.
    pub fn date_for(&self, cui: u64) -> Option<NaiveDate> {
        self.cuis.get(&cui).copied()
    }

    /// Entries in ascending CUI order.
    pub fn entries(&self) -> Vec<FiscalLookupEntry> {
        self.cuis
            .iter()
            .map(|(&cui, &date)| FiscalLookupEntry { cui, date })
            .collect()
    }

    /// Request body: `[{"cui": 273663, "data": "2024-01-01"}, ...]`.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self.entries()).unwrap_or_default()
    }

    /// Query the synchronous endpoint.
    pub fn query(&self, transport: &dyn HttpTransport) -> Result<LookupResult, AnafError> {
        let request = self.post_request(&self.endpoints.sync_url)?;
        info!(count = self.len(), "querying VAT registry");
        let response = check_status(transport.execute(request)?)?;
        LookupResult::from_json(&response.body)
    }

    /// Submit the batch to the asynchronous endpoint; returns the correlation id.
    pub fn submit_async(&self, transport: &dyn HttpTransport) -> Result<String, AnafError> {
        let request = self.post_request(&self.endpoints.async_url)?;
        let response = check_status(transport.execute(request)?)?;
        let submission = AsyncSubmission::from_json(&response.body)?;
        debug!(correlation_id = %submission.correlation_id, "async lookup submitted");
        Ok(submission.correlation_id)
    }

    /// Fetch the result of an asynchronous submission.
    pub fn fetch_async(
        &self,
        transport: &dyn HttpTransport,
        correlation_id: &str,
    ) -> Result<LookupResult, AnafError> {
        let url = build_url(
            &self.endpoints.async_url,
            "",
            &[("id", correlation_id.to_string())],
        )?;
        let response = check_status(transport.execute(HttpRequest::get(url))?)?;
        LookupResult::from_json(&response.body)
    }

    fn post_request(&self, url: &str) -> Result<HttpRequest, AnafError> {
        if self.is_empty() {
            return Err(AnafError::Validation("no CUIs to query".into()));
        }
        Ok(HttpRequest::post(url, Body::Json(self.payload())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn payload_shape() {
        let mut batch = FiscalLookup::new(&AnafConfig::default());
        batch.add_cui(273663, date(2024, 1, 1)).unwrap();
        assert_eq!(
            batch.payload(),
            serde_json::json!([{"cui": 273663, "data": "2024-01-01"}])
        );
    }

    #[test]
    fn zero_limit_rejected() {
        let mut batch = FiscalLookup::new(&AnafConfig::default());
        assert!(batch.set_limit(0).is_err());
        assert_eq!(batch.limit(), 500);
    }

    #[test]
    fn set_endpoint_overrides_target() {
        let mut batch = FiscalLookup::new(&AnafConfig::default());
        batch.set_endpoint(Target::Async, "http://localhost/async");
        assert_eq!(batch.endpoints().async_url, "http://localhost/async");
        assert_ne!(batch.endpoints().sync_url, "http://localhost/async");
    }
}
