//! `pantry-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod barcode;
pub mod error;
pub mod id;

pub use barcode::Barcode;
pub use error::{DomainError, DomainResult};
pub use id::EntryId;
