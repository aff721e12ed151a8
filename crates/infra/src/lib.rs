//! Infrastructure layer: storage, the external product catalog, config, and
//! the two services built on them (product resolution and the inventory ledger).

pub mod alerts;
pub mod catalog;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod ledger;
pub mod resolver;
pub mod settings;
pub mod store;


pub use alerts::AlertService;
pub use context::{Cancelled, OpContext};
pub use error::ServiceError;
pub use ledger::{InventoryLedger, LedgerError};
pub use resolver::{ProductResolver, Resolution, ResolveError};
pub use settings::SettingsService;
