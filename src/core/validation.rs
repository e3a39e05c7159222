use super::error::{AnafError, ValidationError};
use super::types::*;

/// Longest CUI ANAF issues (10 digits).
const CUI_MAX_DIGITS: usize = 10;

/// Check the fields required to produce an e-Factura document.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.number.trim().is_empty() {
        errors.push(ValidationError::new(
            "number",
            "invoice number must not be empty",
        ));
    }

    if invoice.currency.trim().is_empty() {
        errors.push(ValidationError::new(
            "currency",
            "currency code must not be empty",
        ));
    } else if invoice.currency.len() != 3 {
        errors.push(ValidationError::new(
            "currency",
            "currency code must be 3 characters (ISO 4217)",
        ));
    }

    validate_party(&invoice.seller, "seller", &mut errors);
    validate_party(&invoice.buyer, "buyer", &mut errors);

    if invoice.lines.is_empty() {
        errors.push(ValidationError::new(
            "lines",
            "at least one line item is required",
        ));
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        if line.name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("lines[{i}].name"),
                "item name must not be empty",
            ));
        }
    }

    if let Some(storno) = &invoice.storno {
        if storno.invoice_number.trim().is_empty() {
            errors.push(ValidationError::new(
                "storno.invoice_number",
                "referenced invoice number must not be empty",
            ));
        }
    }

    errors
}

fn validate_party(party: &Party, prefix: &str, errors: &mut Vec<ValidationError>) {
    if party.cui.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.cui"),
            "fiscal code (CUI) is required",
        ));
    }
    if party.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.name"),
            "name must not be empty",
        ));
    }
}

/// Parse a CUI as typed by a user ("RO273663", " 273663 ") into its numeric form.
pub fn parse_cui(input: &str) -> Result<u64, AnafError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("RO")
        .or_else(|| trimmed.strip_prefix("ro"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(AnafError::Validation("CUI must not be empty".into()));
    }
    if digits.len() > CUI_MAX_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AnafError::Validation(format!(
            "CUI should be an integer of at most {CUI_MAX_DIGITS} digits, got '{input}'"
        )));
    }

    match digits.parse::<u64>() {
        Ok(0) => Err(AnafError::Validation("CUI must not be zero".into())),
        Ok(cui) => Ok(cui),
        Err(e) => Err(AnafError::Validation(format!("invalid CUI '{input}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cui_accepts_plain_and_prefixed() {
        assert_eq!(parse_cui("273663").unwrap(), 273663);
        assert_eq!(parse_cui("RO273663").unwrap(), 273663);
        assert_eq!(parse_cui("  14399840 ").unwrap(), 14399840);
    }

    #[test]
    fn parse_cui_rejects_garbage() {
        assert!(matches!(parse_cui("abc"), Err(AnafError::Validation(_))));
        assert!(matches!(parse_cui(""), Err(AnafError::Validation(_))));
        assert!(matches!(parse_cui("RO"), Err(AnafError::Validation(_))));
        assert!(matches!(parse_cui("0"), Err(AnafError::Validation(_))));
        assert!(matches!(
            parse_cui("12345678901"),
            Err(AnafError::Validation(_))
        ));
        assert!(matches!(parse_cui("-5"), Err(AnafError::Validation(_))));
    }
}
