use super::xml_utils::{XmlResult, XmlWriter};
use super::{
    CIUS_RO_CUSTOMIZATION_ID, INVOICE_TYPE_CODE, PAYMENT_MEANS_CREDIT_TRANSFER, SCHEMA_LOCATION,
    TAX_CATEGORY_STANDARD, UBL_VERSION_ID, UNIT_CODE, ubl_ns,
};
use crate::core::*;

/// Generate a CIUS-RO UBL 2.1 Invoice document.
///
/// Pure and deterministic: the same invoice always yields the same bytes.
/// Fails with [`AnafError::Validation`] when a required field is missing.
pub fn to_ubl_xml(invoice: &Invoice) -> XmlResult {
    let errors = validate_invoice(invoice);
    if !errors.is_empty() {
        return Err(join_validation_errors(&errors));
    }

    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "Invoice",
        &[
            ("xmlns", ubl_ns::INVOICE),
            ("xmlns:cbc", ubl_ns::CBC),
            ("xmlns:cac", ubl_ns::CAC),
            ("xmlns:ns4", ubl_ns::EXT),
            ("xmlns:xsi", ubl_ns::XSI),
            ("xsi:schemaLocation", SCHEMA_LOCATION),
        ],
    )?;

    w.text_element("cbc:UBLVersionID", UBL_VERSION_ID)?;
    w.text_element("cbc:CustomizationID", CIUS_RO_CUSTOMIZATION_ID)?;
    w.text_element("cbc:ID", &invoice.number)?;
    w.text_element("cbc:IssueDate", &invoice.issue_date.to_string())?;
    if let Some(due) = &invoice.due_date {
        w.text_element("cbc:DueDate", &due.to_string())?;
    }
    w.text_element("cbc:InvoiceTypeCode", INVOICE_TYPE_CODE)?;
    w.text_element("cbc:DocumentCurrencyCode", &invoice.currency)?;
    // VAT must always be reported in RON
    if invoice.needs_tax_currency() {
        w.text_element("cbc:TaxCurrencyCode", TAX_CURRENCY)?;
    }

    if let Some(storno) = &invoice.storno {
        w.start_element("cac:BillingReference")?;
        w.start_element("cac:InvoiceDocumentReference")?;
        w.text_element("cbc:ID", &storno.invoice_number)?;
        w.text_element("cbc:IssueDate", &storno.issue_date.to_string())?;
        w.end_element("cac:InvoiceDocumentReference")?;
        w.end_element("cac:BillingReference")?;
    }

    write_party(&mut w, &invoice.seller, "cac:AccountingSupplierParty")?;
    write_party(&mut w, &invoice.buyer, "cac:AccountingCustomerParty")?;

    w.start_element("cac:PaymentMeans")?;
    w.text_element("cbc:PaymentMeansCode", PAYMENT_MEANS_CREDIT_TRANSFER)?;
    if let Some(iban) = &invoice.seller.iban {
        w.start_element("cac:PayeeFinancialAccount")?;
        w.text_element("cbc:ID", iban)?;
        w.end_element("cac:PayeeFinancialAccount")?;
    }
    w.end_element("cac:PaymentMeans")?;

    // Amounts below are already in RON
    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", invoice.vat_total, TAX_CURRENCY)?;
    w.start_element("cac:TaxSubtotal")?;
    w.amount_element("cbc:TaxableAmount", invoice.net_total, TAX_CURRENCY)?;
    w.amount_element("cbc:TaxAmount", invoice.vat_total, TAX_CURRENCY)?;
    write_tax_category(&mut w, "cac:TaxCategory", invoice.vat_percent)?;
    w.end_element("cac:TaxSubtotal")?;
    w.end_element("cac:TaxTotal")?;

    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element("cbc:LineExtensionAmount", invoice.net_total, TAX_CURRENCY)?;
    w.amount_element("cbc:TaxExclusiveAmount", invoice.net_total, TAX_CURRENCY)?;
    w.amount_element("cbc:TaxInclusiveAmount", invoice.total, TAX_CURRENCY)?;
    w.amount_element("cbc:PayableAmount", invoice.total, TAX_CURRENCY)?;
    w.end_element("cac:LegalMonetaryTotal")?;

    for (index, line) in invoice.lines.iter().enumerate() {
        write_line(&mut w, index + 1, line, invoice.is_storno())?;
    }

    w.end_element("Invoice")?;

    w.into_string()
}

fn write_party(w: &mut XmlWriter, party: &Party, wrapper: &str) -> Result<(), AnafError> {
    w.start_element(wrapper)?;
    w.start_element("cac:Party")?;

    w.start_element("cac:PartyName")?;
    w.text_element("cbc:Name", &party.name)?;
    w.end_element("cac:PartyName")?;

    w.start_element("cac:PostalAddress")?;
    w.text_element("cbc:StreetName", &party.street)?;
    w.text_element("cbc:CityName", &party.city)?;
    w.text_element("cbc:PostalZone", &party.postal_code)?;
    w.text_element("cbc:CountrySubentity", &party.county)?;
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", &party.country_code)?;
    w.end_element("cac:Country")?;
    w.end_element("cac:PostalAddress")?;

    w.start_element("cac:PartyTaxScheme")?;
    w.text_element("cbc:CompanyID", &party.cui)?;
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", "VAT")?;
    w.end_element("cac:TaxScheme")?;
    w.end_element("cac:PartyTaxScheme")?;

    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &party.name)?;
    w.text_element("cbc:CompanyID", &party.cui)?;
    w.end_element("cac:PartyLegalEntity")?;

    if let Some(email) = &party.email {
        w.start_element("cac:Contact")?;
        w.text_element("cbc:ElectronicMail", email)?;
        w.end_element("cac:Contact")?;
    }

    w.end_element("cac:Party")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_tax_category(
    w: &mut XmlWriter,
    wrapper: &str,
    percent: rust_decimal::Decimal,
) -> Result<(), AnafError> {
    w.start_element(wrapper)?;
    w.text_element("cbc:ID", TAX_CATEGORY_STANDARD)?;
    w.text_element("cbc:Percent", &super::xml_utils::format_decimal(percent))?;
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", "VAT")?;
    w.end_element("cac:TaxScheme")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_line(
    w: &mut XmlWriter,
    number: usize,
    line: &LineItem,
    storno: bool,
) -> Result<(), AnafError> {
    let net = if storno { -line.net_total } else { line.net_total };

    w.start_element("cac:InvoiceLine")?;
    w.text_element("cbc:ID", &number.to_string())?;
    w.quantity_element("cbc:InvoicedQuantity", line.quantity, UNIT_CODE)?;
    w.amount_element("cbc:LineExtensionAmount", net, TAX_CURRENCY)?;

    w.start_element("cac:Item")?;
    w.text_element("cbc:Name", &line.name)?;
    write_tax_category(w, "cac:ClassifiedTaxCategory", line.vat_percent)?;
    w.end_element("cac:Item")?;

    w.start_element("cac:Price")?;
    w.amount_element("cbc:PriceAmount", line.unit_price, TAX_CURRENCY)?;
    w.end_element("cac:Price")?;

    w.end_element("cac:InvoiceLine")?;
    Ok(())
}
