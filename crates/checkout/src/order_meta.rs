//! Metadata written onto a finalized order.
//!
//! The host platform persists these entries and the note; this module only
//! decides what they contain.

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::SelectedOptIns;

/// Meta key for the selected regular opt-in ids.
pub const OPT_INS_KEY: &str = "_tcg_ship_logic_optins";

/// Meta key for the selected time-based opt-in ids.
pub const TIME_BASED_OPT_INS_KEY: &str = "_tcg_ship_logic_time_based_optins";

/// Meta key for the insurance flag (`"1"` / `"0"`).
pub const BILLING_INSURANCE_KEY: &str = "_tcg_billing_insurance";

/// One metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaEntry {
    pub key: &'static str,
    pub value: Value,
}

/// Everything to persist on the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMeta {
    pub meta: Vec<MetaEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderMeta {
    /// Build the metadata for the shopper's final selections.
    #[must_use]
    pub fn new(selected: &SelectedOptIns, insurance: bool) -> Self {
        let meta = vec![
            MetaEntry {
                key: OPT_INS_KEY,
                value: json!(selected.regular),
            },
            MetaEntry {
                key: TIME_BASED_OPT_INS_KEY,
                value: json!(selected.time_based),
            },
            MetaEntry {
                key: BILLING_INSURANCE_KEY,
                value: Value::String(if insurance { "1" } else { "0" }.to_string()),
            },
        ];

        Self {
            meta,
            note: order_note(selected),
        }
    }
}

/// The customer-visible order note, or `None` when nothing was selected.
#[must_use]
pub fn order_note(selected: &SelectedOptIns) -> Option<String> {
    if selected.is_empty() {
        return None;
    }

    let join = |ids: &[shiplogic_core::OptInRateId]| {
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut note = "TCG Shipping options selected:".to_string();
    if !selected.regular.is_empty() {
        note.push_str(" Regular: ");
        note.push_str(&join(&selected.regular));
    }
    if !selected.time_based.is_empty() {
        note.push_str(" Time-based: ");
        note.push_str(&join(&selected.time_based));
    }
    Some(note)
}
