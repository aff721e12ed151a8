//! Mapping from raw catalog answers to `Product`s.

use pantry_core::Barcode;

use crate::product::Product;

/// What the external catalog reported for a barcode it recognised.
///
/// Fields are kept as loose as the catalog sends them; `into_product` decides
/// what a usable product looks like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: Option<String>,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
}

impl CatalogEntry {
    /// Build the resolved product row for `barcode`.
    ///
    /// The first category tag wins. Blank strings count as absent; a blank name
    /// falls back to the barcode so the row is still displayable.
    pub fn into_product(self, barcode: Barcode) -> Product {
        let name = non_blank(self.name).unwrap_or_else(|| barcode.as_str().to_string());
        let category = self.categories.into_iter().find_map(|c| non_blank(Some(c)));
        Product {
            barcode,
            name,
            category,
            image_url: non_blank(self.image_url),
            resolved: true,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_first_category_and_image() {
        let entry = CatalogEntry {
            name: Some("Coca-Cola 330ml".to_string()),
            categories: vec!["beverages".to_string(), "sodas".to_string()],
            image_url: Some("https://images.example/coke.jpg".to_string()),
        };
        let p = entry.into_product(Barcode::parse("5000112637922").unwrap());
        assert!(p.resolved);
        assert_eq!(p.name, "Coca-Cola 330ml");
        assert_eq!(p.category.as_deref(), Some("beverages"));
        assert_eq!(p.image_url.as_deref(), Some("https://images.example/coke.jpg"));
    }

    #[test]
    fn blank_fields_are_absent_and_name_falls_back() {
        let entry = CatalogEntry {
            name: Some("  ".to_string()),
            categories: vec![],
            image_url: Some(String::new()),
        };
        let p = entry.into_product(Barcode::parse("12345670").unwrap());
        assert!(p.resolved);
        assert_eq!(p.name, "12345670");
        assert_eq!(p.category, None);
        assert_eq!(p.image_url, None);
    }
}
