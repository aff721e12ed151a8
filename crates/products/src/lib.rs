//! Product metadata domain module.
//!
//! Products are keyed by barcode and hold whatever the external catalog told us
//! about them, or a placeholder ("stub") when it told us nothing in time.

pub mod catalog;
pub mod product;

pub use catalog::CatalogEntry;
pub use product::{Product, ProductDetails};
