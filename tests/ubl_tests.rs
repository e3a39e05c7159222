#![cfg(feature = "ubl")]

use chrono::NaiveDate;
use anaf::core::*;
use anaf::ubl::{self, to_ubl_xml};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seller() -> Party {
    PartyBuilder::new("Furnizor SRL", "RO273663")
        .address("Str. Lunga 1", "Bucuresti", "010101", "RO-B", "RO")
        .iban("RO49AAAA1B31007593840000")
        .email("facturi@furnizor.ro")
        .build()
}

fn buyer() -> Party {
    PartyBuilder::new("Client SA", "14399840")
        .address("Bd. Unirii 5", "Cluj-Napoca", "400001", "RO-CJ", "RO")
        .build()
}

fn ron_invoice() -> InvoiceBuilder {
    InvoiceBuilder::new("F-2024-001", date(2024, 3, 1))
        .due_date(date(2024, 3, 31))
        .seller(seller())
        .buyer(buyer())
        .add_line(
            LineItemBuilder::new("Consultanta", dec!(2), dec!(100.00), dec!(200.00))
                .vat_percent(dec!(19))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("Transport", dec!(1), dec!(49.99), dec!(50.00))
                .vat_percent(dec!(19))
                .build(),
        )
        .totals(dec!(250.00), dec!(47.50), dec!(297.50))
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn header_and_namespaces() {
    let xml = to_ubl_xml(&ron_invoice().build().unwrap()).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(&format!("xmlns=\"{}\"", ubl::ubl_ns::INVOICE)));
    assert!(xml.contains(&format!("xmlns:cbc=\"{}\"", ubl::ubl_ns::CBC)));
    assert!(xml.contains(&format!("xmlns:cac=\"{}\"", ubl::ubl_ns::CAC)));
    assert!(xml.contains("<cbc:UBLVersionID>2.1</cbc:UBLVersionID>"));
    assert!(xml.contains(&format!(
        "<cbc:CustomizationID>{}</cbc:CustomizationID>",
        ubl::CIUS_RO_CUSTOMIZATION_ID
    )));
    assert!(xml.contains("<cbc:IssueDate>2024-03-01</cbc:IssueDate>"));
    assert!(xml.contains("<cbc:DueDate>2024-03-31</cbc:DueDate>"));
    assert!(xml.contains("<cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>"));
    assert!(xml.contains("<cbc:DocumentCurrencyCode>RON</cbc:DocumentCurrencyCode>"));
}

#[test]
fn ron_invoice_has_no_tax_currency() {
    let xml = to_ubl_xml(&ron_invoice().build().unwrap()).unwrap();
    assert_eq!(count(&xml, "TaxCurrencyCode"), 0);
}

#[test]
fn foreign_currency_declares_ron_once() {
    let invoice = ron_invoice().currency("EUR").build().unwrap();
    let xml = to_ubl_xml(&invoice).unwrap();

    assert!(xml.contains("<cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>"));
    assert_eq!(
        count(&xml, "<cbc:TaxCurrencyCode>RON</cbc:TaxCurrencyCode>"),
        1
    );
    // Every amount is expressed in RON regardless of the document currency.
    assert_eq!(count(&xml, "currencyID=\"EUR\""), 0);
    assert!(xml.contains("<cbc:TaxAmount currencyID=\"RON\">47.50</cbc:TaxAmount>"));
}

#[test]
fn parties_and_payment() {
    let xml = to_ubl_xml(&ron_invoice().build().unwrap()).unwrap();

    let supplier_start = xml.find("<cac:AccountingSupplierParty>").unwrap();
    let customer_start = xml.find("<cac:AccountingCustomerParty>").unwrap();
    assert!(supplier_start < customer_start);

    let supplier = &xml[supplier_start..customer_start];
    assert!(supplier.contains("<cbc:Name>Furnizor SRL</cbc:Name>"));
    assert!(supplier.contains("<cbc:CompanyID>RO273663</cbc:CompanyID>"));
    assert!(supplier.contains("<cbc:CountrySubentity>RO-B</cbc:CountrySubentity>"));
    assert!(supplier.contains("<cbc:IdentificationCode>RO</cbc:IdentificationCode>"));
    assert!(supplier.contains("<cbc:ElectronicMail>facturi@furnizor.ro</cbc:ElectronicMail>"));

    let customer_end = xml.find("</cac:AccountingCustomerParty>").unwrap();
    let customer = &xml[customer_start..customer_end];
    assert!(customer.contains("<cbc:CompanyID>14399840</cbc:CompanyID>"));
    assert!(!customer.contains("cac:Contact"));

    assert!(xml.contains("<cbc:PaymentMeansCode>31</cbc:PaymentMeansCode>"));
    assert!(xml.contains("<cbc:ID>RO49AAAA1B31007593840000</cbc:ID>"));
}

#[test]
fn totals_are_taken_verbatim() {
    let xml = to_ubl_xml(&ron_invoice().build().unwrap()).unwrap();

    assert!(xml.contains("<cbc:TaxableAmount currencyID=\"RON\">250.00</cbc:TaxableAmount>"));
    assert!(xml.contains("<cbc:Percent>19</cbc:Percent>"));
    assert!(xml.contains(
        "<cbc:TaxExclusiveAmount currencyID=\"RON\">250.00</cbc:TaxExclusiveAmount>"
    ));
    assert!(xml.contains(
        "<cbc:TaxInclusiveAmount currencyID=\"RON\">297.50</cbc:TaxInclusiveAmount>"
    ));
    assert!(xml.contains("<cbc:PayableAmount currencyID=\"RON\">297.50</cbc:PayableAmount>"));
}

#[test]
fn lines_are_numbered_in_order() {
    let xml = to_ubl_xml(&ron_invoice().build().unwrap()).unwrap();

    assert_eq!(count(&xml, "<cac:InvoiceLine>"), 2);
    let first = xml.find("<cbc:Name>Consultanta</cbc:Name>").unwrap();
    let second = xml.find("<cbc:Name>Transport</cbc:Name>").unwrap();
    assert!(first < second);

    assert!(xml.contains("<cbc:InvoicedQuantity unitCode=\"C61\">2</cbc:InvoicedQuantity>"));
    assert!(xml.contains(
        "<cbc:LineExtensionAmount currencyID=\"RON\">200.00</cbc:LineExtensionAmount>"
    ));
    // Line totals are emitted as supplied, not recomputed from the price.
    assert!(xml.contains(
        "<cbc:LineExtensionAmount currencyID=\"RON\">50.00</cbc:LineExtensionAmount>"
    ));
    assert!(xml.contains("<cbc:PriceAmount currencyID=\"RON\">100.00</cbc:PriceAmount>"));
    assert!(xml.contains("<cbc:PriceAmount currencyID=\"RON\">49.99</cbc:PriceAmount>"));
    assert_eq!(count(&xml, "<cac:ClassifiedTaxCategory>"), 2);
}

#[test]
fn storno_references_original_and_negates_lines() {
    let invoice = ron_invoice()
        .storno("F-2024-000", date(2024, 2, 1))
        .totals(dec!(-250.00), dec!(-47.50), dec!(-297.50))
        .build()
        .unwrap();
    let xml = to_ubl_xml(&invoice).unwrap();

    let reference = xml.find("<cac:BillingReference>").unwrap();
    assert!(reference < xml.find("<cac:AccountingSupplierParty>").unwrap());
    assert!(xml.contains(
        "<cac:InvoiceDocumentReference>\n      <cbc:ID>F-2024-000</cbc:ID>\n      <cbc:IssueDate>2024-02-01</cbc:IssueDate>"
    ));
    assert!(xml.contains(
        "<cbc:LineExtensionAmount currencyID=\"RON\">-200.00</cbc:LineExtensionAmount>"
    ));
    assert!(xml.contains(
        "<cbc:LineExtensionAmount currencyID=\"RON\">-50.00</cbc:LineExtensionAmount>"
    ));
    // Unit prices and quantities keep their sign.
    assert!(xml.contains("<cbc:PriceAmount currencyID=\"RON\">100.00</cbc:PriceAmount>"));
    assert!(xml.contains("<cbc:InvoicedQuantity unitCode=\"C61\">2</cbc:InvoicedQuantity>"));
}

#[test]
fn regular_invoice_has_no_billing_reference() {
    let xml = to_ubl_xml(&ron_invoice().build().unwrap()).unwrap();
    assert!(!xml.contains("BillingReference"));
}

#[test]
fn output_is_deterministic() {
    let invoice = ron_invoice().currency("EUR").build().unwrap();
    assert_eq!(to_ubl_xml(&invoice).unwrap(), to_ubl_xml(&invoice).unwrap());
}

#[test]
fn special_characters_are_escaped() {
    let invoice = ron_invoice()
        .buyer(
            PartyBuilder::new("Popescu & Fiii <SRL>", "14399840")
                .address("Str. \"Noua\" 2", "Iasi", "700001", "RO-IS", "RO")
                .build(),
        )
        .build()
        .unwrap();
    let xml = to_ubl_xml(&invoice).unwrap();
    assert!(xml.contains("Popescu &amp; Fiii &lt;SRL&gt;"));
}

#[test]
fn invalid_invoice_is_rejected_before_rendering() {
    let mut invoice = ron_invoice().build().unwrap();
    invoice.buyer.cui.clear();
    invoice.lines.clear();

    let err = to_ubl_xml(&invoice).unwrap_err();
    assert!(matches!(err, AnafError::Validation(_)));
    let msg = err.to_string();
    assert!(msg.contains("buyer.cui"));
    assert!(msg.contains("lines"));
}

#[test]
fn invoice_from_json_renders() {
    let json = serde_json::json!({
        "number": "F-7",
        "issue_date": "2024-05-10",
        "currency": "RON",
        "net_total": "100.00",
        "vat_total": "9.00",
        "total": "109.00",
        "vat_percent": "9",
        "seller": {
            "name": "Furnizor SRL", "street": "Str. Lunga 1", "city": "Bucuresti",
            "postal_code": "010101", "county": "RO-B", "country_code": "RO", "cui": "RO273663"
        },
        "buyer": {
            "name": "Client SA", "street": "Bd. Unirii 5", "city": "Cluj-Napoca",
            "postal_code": "400001", "county": "RO-CJ", "country_code": "RO", "cui": "14399840"
        },
        "lines": [
            {"name": "Carte", "quantity": "1", "unit_price": "100.00",
             "vat_percent": "9", "net_total": "100.00"}
        ]
    });
    let invoice: Invoice = serde_json::from_value(json).unwrap();
    assert!(!invoice.is_storno());

    let xml = to_ubl_xml(&invoice).unwrap();
    assert!(xml.contains("<cbc:ID>F-7</cbc:ID>"));
    assert!(xml.contains("<cbc:TaxAmount currencyID=\"RON\">9.00</cbc:TaxAmount>"));
    assert!(!xml.contains("cbc:DueDate"));
}
