use comfy_table::{Cell, Table, presets::UTF8_FULL};

use anaf::efactura::{EinvoiceMessage, UploadResponse};
use anaf::lookup::LookupResult;

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

pub fn print_lookup(result: &LookupResult) {
    let rows = result
        .found
        .iter()
        .map(|s| {
            vec![
                s.cui.to_string(),
                s.name.clone(),
                s.date.clone(),
                yes_no(s.is_active),
                yes_no(s.vat_eligible),
                yes_no(s.vat_split_eligible),
                yes_no(s.vat_collection_eligible),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["CUI", "Name", "Date", "Active", "VAT", "Split VAT", "VAT on collection"],
            rows
        )
    );
    if !result.not_found.is_empty() {
        let missing: Vec<String> = result.not_found.iter().map(u64::to_string).collect();
        println!("Not found: {}", missing.join(", "));
    }
}

pub fn print_messages(messages: &[EinvoiceMessage]) {
    let rows = messages
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.message_type.to_string(),
                m.created_at.clone(),
                m.cif.clone(),
                m.request_id.clone(),
                m.details.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Type", "Created", "CIF", "Request", "Details"], rows)
    );
}

pub fn print_upload(response: &UploadResponse) {
    let rows = response
        .attributes
        .iter()
        .map(|(k, v)| vec![k.clone(), v.clone()])
        .collect();
    println!("{}", pretty_table(&["Attribute", "Value"], rows));
    for error in &response.errors {
        println!("error: {error}");
    }
}
