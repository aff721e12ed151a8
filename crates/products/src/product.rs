use serde::{Deserialize, Serialize};

use pantry_core::{Barcode, DomainError, DomainResult};

/// Cached product metadata, one per barcode.
///
/// `resolved == false` marks a stub: a placeholder written after the catalog was
/// unknown or slow, whose `name` is the barcode itself. A resolved product never
/// goes back to being a stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ean")]
    pub barcode: Barcode,
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub resolved: bool,
}

impl Product {
    /// Placeholder for a barcode the catalog could not describe.
    pub fn stub(barcode: Barcode) -> Self {
        Self {
            name: barcode.as_str().to_string(),
            barcode,
            category: None,
            image_url: None,
            resolved: false,
        }
    }

    pub fn is_stub(&self) -> bool {
        !self.resolved
    }

    /// Upsert semantics for a successful catalog fetch: take every metadata
    /// column from `fetched` and mark the row resolved.
    pub fn absorb(&mut self, fetched: &Product) {
        debug_assert_eq!(self.barcode, fetched.barcode);
        self.name = fetched.name.clone();
        self.category = fetched.category.clone();
        self.image_url = fetched.image_url.clone();
        self.resolved = true;
    }

    /// Manual edit: replaces name and category, leaves image and `resolved` alone.
    pub fn apply_details(&mut self, details: &ProductDetails) {
        self.name = details.name.clone();
        self.category = details.category.clone();
    }
}

/// A user-supplied correction of a product's display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    name: String,
    category: Option<String>,
}

impl ProductDetails {
    pub fn new(name: impl Into<String>, category: Option<String>) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self { name, category })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn barcode(raw: &str) -> Barcode {
        Barcode::parse(raw).unwrap()
    }

    fn fetched(raw: &str, name: &str) -> Product {
        Product {
            barcode: barcode(raw),
            name: name.to_string(),
            category: Some("en:beverages".to_string()),
            image_url: Some("https://images.example/1.jpg".to_string()),
            resolved: true,
        }
    }

    #[test]
    fn stub_is_named_after_its_barcode() {
        let p = Product::stub(barcode("00000000"));
        assert_eq!(p.name, "00000000");
        assert!(p.is_stub());
        assert_eq!(p.category, None);
        assert_eq!(p.image_url, None);
    }

    #[test]
    fn absorb_upgrades_stub_to_resolved() {
        let mut p = Product::stub(barcode("5000112637922"));
        p.absorb(&fetched("5000112637922", "Coca-Cola 330ml"));
        assert!(p.resolved);
        assert_eq!(p.name, "Coca-Cola 330ml");
        assert_eq!(p.category.as_deref(), Some("en:beverages"));
    }

    #[test]
    fn absorb_is_idempotent() {
        let f = fetched("5000112637922", "Coca-Cola 330ml");
        let mut once = Product::stub(f.barcode.clone());
        once.absorb(&f);
        let mut twice = once.clone();
        twice.absorb(&f);
        assert_eq!(once, twice);
    }

    #[test]
    fn manual_details_keep_resolution_state_and_image() {
        let mut p = fetched("5000112637922", "Coca-Cola 330ml");
        let details = ProductDetails::new("  Coke  ", Some("  ".to_string())).unwrap();
        p.apply_details(&details);
        assert_eq!(p.name, "Coke");
        assert_eq!(p.category, None);
        assert!(p.resolved);
        assert!(p.image_url.is_some());

        let mut stub = Product::stub(barcode("00000000"));
        stub.apply_details(&details);
        assert!(stub.is_stub());
    }

    #[test]
    fn blank_manual_name_is_rejected() {
        assert!(matches!(
            ProductDetails::new("   ", None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn serializes_with_ean_key() {
        let json = serde_json::to_value(Product::stub(barcode("12345670"))).unwrap();
        assert_eq!(json["ean"], "12345670");
        assert_eq!(json["resolved"], false);
        assert!(json["category"].is_null());
    }

    proptest! {
        #[test]
        fn resolved_never_reverts(names in proptest::collection::vec("[a-zA-Z ]{1,12}", 1..8)) {
            let mut p = Product::stub(barcode("5000112637922"));
            let mut seen_resolved = false;
            for (i, name) in names.iter().enumerate() {
                if i % 2 == 0 {
                    p.absorb(&fetched("5000112637922", name));
                    seen_resolved = true;
                } else if let Ok(details) = ProductDetails::new(name.clone(), None) {
                    p.apply_details(&details);
                }
                prop_assert_eq!(p.resolved, seen_resolved);
            }
        }
    }
}
