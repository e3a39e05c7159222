use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::AnafError;

pub type XmlResult = Result<String, AnafError>;

fn xml_io(e: std::io::Error) -> AnafError {
    AnafError::Xml(format!("XML write error: {e}"))
}

pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, AnafError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, AnafError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| AnafError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, AnafError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, AnafError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, AnafError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, AnafError> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, AnafError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write a decimal amount with currencyID attribute.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, AnafError> {
        self.text_element_with_attrs(name, &format_decimal(amount), &[("currencyID", currency)])
    }

    /// Write a quantity with unitCode attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
    ) -> Result<&mut Self, AnafError> {
        self.text_element_with_attrs(name, &format_decimal(qty), &[("unitCode", unit)])
    }
}

/// Format a Decimal for XML output exactly as given: the caller's scale is
/// kept and nothing is rounded.
pub fn format_decimal(d: Decimal) -> String {
    if d.is_zero() {
        // A negated zero must not come out as "-0".
        return d.abs().to_string();
    }
    d.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_decimal_keeps_scale() {
        assert_eq!(format_decimal(Decimal::new(100, 0)), "100");
        assert_eq!(format_decimal(Decimal::new(4990, 2)), "49.90");
        assert_eq!(format_decimal(Decimal::new(5, 3)), "0.005");
        assert_eq!(format_decimal(Decimal::new(-12345, 2)), "-123.45");
    }

    #[test]
    fn negated_zero_has_no_sign() {
        assert_eq!(format_decimal(-Decimal::new(0, 2)), "0.00");
    }

    #[test]
    fn writer_escapes_text() {
        let mut w = XmlWriter::new().unwrap();
        w.text_element("cbc:Name", "A & B <SRL>").unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<cbc:Name>A &amp; B &lt;SRL&gt;</cbc:Name>"));
    }
}
