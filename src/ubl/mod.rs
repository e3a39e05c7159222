//! UBL 2.1 invoice generation for e-Factura (CIUS-RO).
//!
//! # Example
//!
//! ```no_run
//! use anaf::core::*;
//! use anaf::ubl;
//!
//! let invoice: Invoice = todo!(); // build via InvoiceBuilder
//! let xml = ubl::to_ubl_xml(&invoice).unwrap();
//! ```

mod invoice;
pub(crate) mod xml_utils;

pub use invoice::to_ubl_xml;

/// CIUS-RO 1.0.1 customization identifier.
pub const CIUS_RO_CUSTOMIZATION_ID: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:efactura.mfinante.ro:CIUS-RO:1.0.1";

/// UBL specification version.
pub const UBL_VERSION_ID: &str = "2.1";

/// UNTDID 1001 code for a commercial invoice.
pub const INVOICE_TYPE_CODE: &str = "380";

/// UNTDID 4461 code for credit transfer.
pub const PAYMENT_MEANS_CREDIT_TRANSFER: &str = "31";

/// UN/ECE Rec 20 unit code used for every invoiced quantity.
pub const UNIT_CODE: &str = "C61";

/// UNTDID 5305 standard rate tax category.
pub const TAX_CATEGORY_STANDARD: &str = "S";

/// Schema location hint written on the root element.
pub const SCHEMA_LOCATION: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2 \
     http://docs.oasis-open.org/ubl/os-UBL-2.1/xsd/maindoc/UBL-Invoice-2.1.xsd";

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const EXT: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}
