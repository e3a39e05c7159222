//! Taxpayer VAT-registry lookup (PlatitorTvaRest).
//!
//! A [`FiscalLookup`] collects up to `limit` CUIs, each with the date the
//! status should be evaluated at, and queries the registry in one request.
//!
//! # Example
//!
//! ```no_run
//! use anaf::core::AnafConfig;
//! use anaf::lookup::FiscalLookup;
//! use anaf::transport::ReqwestTransport;
//! use chrono::NaiveDate;
//!
//! let mut batch = FiscalLookup::new(&AnafConfig::default());
//! batch.add_cui(273663, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
//! let result = batch.query(&ReqwestTransport::new().unwrap()).unwrap();
//! for status in &result.found {
//!     println!("{} active={}", status.name, status.is_active);
//! }
//! ```

mod batch;
mod result;

pub use batch::{FiscalLookup, FiscalLookupEntry, Target};
pub use result::{LookupResult, TaxpayerStatus};
