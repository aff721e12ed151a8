//! EAN-8 / EAN-13 product barcodes.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A validated product barcode: exactly 8 or 13 ASCII decimal digits.
///
/// The check digit is not verified; shops print plenty of in-house codes that
/// fail it, and the catalog simply reports those as unknown.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    pub const EAN8_LEN: usize = 8;
    pub const EAN13_LEN: usize = 13;

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let len_ok = raw.len() == Self::EAN8_LEN || raw.len() == Self::EAN13_LEN;
        if !len_ok || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_barcode(raw));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Barcode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Barcode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_ean8_and_ean13() {
        assert_eq!(Barcode::parse("00000000").unwrap().as_str().len(), Barcode::EAN8_LEN);
        assert_eq!(Barcode::parse("5000112637922").unwrap().as_str().len(), Barcode::EAN13_LEN);
    }

    #[test]
    fn rejects_other_lengths_and_non_digits() {
        for raw in ["", "1234567", "123456789", "500011263792", "50001126379222", "500011263792x", " 00000000"] {
            assert_eq!(
                Barcode::parse(raw),
                Err(DomainError::InvalidBarcode(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn deserialize_validates() {
        let ok: Barcode = serde_json::from_str("\"12345670\"").unwrap();
        assert_eq!(ok.as_str(), "12345670");
        assert!(serde_json::from_str::<Barcode>("\"1234\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"12345670\"");
    }

    proptest! {
        #[test]
        fn any_8_or_13_digit_string_parses(raw in "([0-9]{8}|[0-9]{13})") {
            let parsed = Barcode::parse(&raw).unwrap();
            prop_assert_eq!(parsed.as_str(), raw.as_str());
        }

        #[test]
        fn other_digit_lengths_are_rejected(raw in "[0-9]{0,20}") {
            prop_assume!(raw.len() != 8 && raw.len() != 13);
            prop_assert!(Barcode::parse(&raw).is_err());
        }
    }
}
