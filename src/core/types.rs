use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency in which ANAF expects every VAT amount.
pub const TAX_CURRENCY: &str = "RON";

/// An e-Factura invoice.
///
/// Totals are supplied by the caller, already rounded and converted to RON;
/// nothing here derives them from the lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number, unique per issuer.
    pub number: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Payment due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Document currency (ISO 4217, e.g. "RON", "EUR").
    pub currency: String,
    /// Sum of line net amounts.
    pub net_total: Decimal,
    /// Total VAT amount.
    pub vat_total: Decimal,
    /// Grand total (net + VAT).
    pub total: Decimal,
    /// VAT percent reported in the document-level tax breakdown.
    pub vat_percent: Decimal,
    pub seller: Party,
    pub buyer: Party,
    /// Lines in emission order; position determines the line number.
    pub lines: Vec<LineItem>,
    /// Set when this document cancels (storno) an earlier invoice.
    #[serde(default)]
    pub storno: Option<StornoReference>,
}

impl Invoice {
    /// Whether this document is a storno of an earlier invoice.
    pub fn is_storno(&self) -> bool {
        self.storno.is_some()
    }

    /// Whether a RON tax currency must be declared next to the document currency.
    pub fn needs_tax_currency(&self) -> bool {
        self.currency != TAX_CURRENCY
    }
}

/// Reference to the invoice cancelled by a storno document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StornoReference {
    /// Number of the original invoice.
    pub invoice_number: String,
    /// Issue date of the original invoice.
    pub issue_date: NaiveDate,
}

/// Seller or buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Registered name.
    pub name: String,
    /// Street address.
    pub street: String,
    pub city: String,
    pub postal_code: String,
    /// County (judet), e.g. "RO-B".
    pub county: String,
    /// Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
    /// Fiscal identification code (CUI / CIF), with or without the "RO" prefix.
    pub cui: String,
    /// Bank account (IBAN).
    #[serde(default)]
    pub iban: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item name.
    pub name: String,
    pub quantity: Decimal,
    /// Net price per unit.
    pub unit_price: Decimal,
    /// VAT percent for this line.
    pub vat_percent: Decimal,
    /// Net line total, computed by the caller.
    pub net_total: Decimal,
}
