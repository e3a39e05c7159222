use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::{AnafError, ValidationError, join_validation_errors};
use super::types::*;
use super::validation;

/// Builder for constructing e-Factura invoices.
///
/// ```
/// use anaf::core::*;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let seller = PartyBuilder::new("Furnizor SRL", "RO273663")
///     .address("Str. Lunga 1", "Bucuresti", "010101", "RO-B", "RO")
///     .iban("RO49AAAA1B31007593840000")
///     .build();
/// let buyer = PartyBuilder::new("Client SA", "14399840")
///     .address("Bd. Unirii 5", "Cluj-Napoca", "400001", "RO-CJ", "RO")
///     .build();
///
/// let invoice = InvoiceBuilder::new("F-2024-001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .seller(seller)
///     .buyer(buyer)
///     .add_line(LineItemBuilder::new("Consultanta", Decimal::new(2, 0), Decimal::new(100, 0), Decimal::new(200, 0))
///         .vat_percent(Decimal::new(19, 0))
///         .build())
///     .totals(Decimal::new(200, 0), Decimal::new(38, 0), Decimal::new(238, 0))
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.lines.len(), 1);
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency: String,
    net_total: Decimal,
    vat_total: Decimal,
    total: Decimal,
    vat_percent: Option<Decimal>,
    seller: Option<Party>,
    buyer: Option<Party>,
    lines: Vec<LineItem>,
    storno: Option<StornoReference>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            due_date: None,
            currency: TAX_CURRENCY.to_string(),
            net_total: Decimal::ZERO,
            vat_total: Decimal::ZERO,
            total: Decimal::ZERO,
            vat_percent: None,
            seller: None,
            buyer: None,
            lines: Vec::new(),
            storno: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    /// Net, VAT and grand totals, pre-rounded by the caller.
    pub fn totals(mut self, net_total: Decimal, vat_total: Decimal, total: Decimal) -> Self {
        self.net_total = net_total;
        self.vat_total = vat_total;
        self.total = total;
        self
    }

    /// Document-level VAT percent. Defaults to the first line's percent.
    pub fn vat_percent(mut self, percent: Decimal) -> Self {
        self.vat_percent = Some(percent);
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = Some(party);
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = Some(party);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    /// Mark this invoice as a storno of `invoice_number` issued on `issue_date`.
    pub fn storno(mut self, invoice_number: impl Into<String>, issue_date: NaiveDate) -> Self {
        self.storno = Some(StornoReference {
            invoice_number: invoice_number.into(),
            issue_date,
        });
        self
    }

    /// Build the invoice and run validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Invoice, AnafError> {
        let mut missing = Vec::new();
        if self.seller.is_none() {
            missing.push(ValidationError::new("seller", "seller is required"));
        }
        if self.buyer.is_none() {
            missing.push(ValidationError::new("buyer", "buyer is required"));
        }

        let vat_percent = self
            .vat_percent
            .or_else(|| self.lines.first().map(|l| l.vat_percent))
            .unwrap_or(Decimal::ZERO);

        let invoice = Invoice {
            number: self.number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            currency: self.currency,
            net_total: self.net_total,
            vat_total: self.vat_total,
            total: self.total,
            vat_percent,
            seller: self.seller.unwrap_or_default(),
            buyer: self.buyer.unwrap_or_default(),
            lines: self.lines,
            storno: self.storno,
        };

        // A missing party is reported once, not field by field.
        let mut found = validation::validate_invoice(&invoice);
        found.retain(|e| !errors_cover(&missing, &e.field));
        let mut errors = missing;
        errors.append(&mut found);
        if !errors.is_empty() {
            return Err(join_validation_errors(&errors));
        }

        Ok(invoice)
    }
}

fn errors_cover(missing: &[ValidationError], field: &str) -> bool {
    missing.iter().any(|m| {
        field
            .strip_prefix(m.field.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    cui: String,
    street: String,
    city: String,
    postal_code: String,
    county: String,
    country_code: String,
    iban: Option<String>,
    email: Option<String>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, cui: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cui: cui.into(),
            street: String::new(),
            city: String::new(),
            postal_code: String::new(),
            county: String::new(),
            country_code: "RO".to_string(),
            iban: None,
            email: None,
        }
    }

    pub fn address(
        mut self,
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        county: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        self.street = street.into();
        self.city = city.into();
        self.postal_code = postal_code.into();
        self.county = county.into();
        self.country_code = country_code.into();
        self
    }

    pub fn iban(mut self, iban: impl Into<String>) -> Self {
        self.iban = Some(iban.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            county: self.county,
            country_code: self.country_code,
            cui: self.cui,
            iban: self.iban,
            email: self.email,
        }
    }
}

/// Builder for LineItem.
///
/// The net line total is supplied by the caller, already rounded; it is
/// never derived from quantity and price.
pub struct LineItemBuilder {
    name: String,
    quantity: Decimal,
    unit_price: Decimal,
    net_total: Decimal,
    vat_percent: Decimal,
}

impl LineItemBuilder {
    pub fn new(
        name: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        net_total: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            net_total,
            vat_percent: Decimal::new(19, 0),
        }
    }

    pub fn vat_percent(mut self, percent: Decimal) -> Self {
        self.vat_percent = percent;
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            vat_percent: self.vat_percent,
            net_total: self.net_total,
        }
    }
}
