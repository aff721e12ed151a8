//! On-demand stock warnings.
//!
//! Alerts are not stored anywhere; they are recomputed from a ledger snapshot
//! each time someone asks.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use pantry_core::Barcode;

use crate::entry::InventoryEntry;
use crate::settings::Settings;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowStock,
    ExpirySoon,
}

/// A single active warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub ean: Barcode,
    pub product_name: String,
    pub detail: String,
}

/// Compute every active alert for `entries` as of `today`.
///
/// An entry can raise both kinds. Already-expired items report a non-positive
/// day count rather than being dropped.
pub fn scan(entries: &[InventoryEntry], settings: &Settings, today: NaiveDate) -> Vec<Alert> {
    // A window past the calendar's end covers every representable expiry.
    let warn_before = today
        .checked_add_days(Days::new(u64::from(settings.expiry_warning_days)))
        .unwrap_or(NaiveDate::MAX);
    let mut alerts = Vec::new();

    for entry in entries {
        if entry.is_low_stock() {
            alerts.push(Alert {
                kind: AlertKind::LowStock,
                ean: entry.product.barcode.clone(),
                product_name: entry.product.name.clone(),
                detail: format!(
                    "Only {} item(s) left (threshold: {})",
                    entry.quantity, entry.low_stock_threshold
                ),
            });
        }

        if let Some(expiry) = entry.expiry_date {
            if expiry <= warn_before {
                let days_left = (expiry - today).num_days();
                alerts.push(Alert {
                    kind: AlertKind::ExpirySoon,
                    ean: entry.product.barcode.clone(),
                    product_name: entry.product.name.clone(),
                    detail: format!("Expires in {days_left} day(s) ({})", expiry.format("%Y-%m-%d")),
                });
            }
        }
    }

    alerts
}
