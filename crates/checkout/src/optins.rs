//! Opt-in display list.
//!
//! Joins the carrier's opt-in catalog with the last rate result to decide
//! which add-ons to show and which are currently applied.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use shiplogic_core::{CurrencyCode, OptInCatalog, OptInKind, OptInRateId, Price, RatesResponse};

/// One opt-in as the checkout renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptInOption {
    pub id: OptInRateId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub price_formatted: String,
    #[serde(rename = "type")]
    pub kind: OptInKind,
    pub checked: bool,
}

/// Normalize an opt-in name for matching against the configured list:
/// lower-cased, slashes removed, a double space folded once, then every
/// space turned into an underscore.
///
/// Surrounding spaces are not trimmed; `"Door "` becomes `"door_"`.
#[must_use]
pub fn normalize_opt_in_name(name: &str) -> String {
    name.to_lowercase()
        .replace('/', "")
        .replace("  ", " ")
        .replace(' ', "_")
}

/// Build the display list.
///
/// Only opt-ins whose normalized name is in `visible` are included, regular
/// entries first. An entry is `checked` when the carrier applied it to the
/// first quote, regardless of what the shopper selected.
#[must_use]
pub fn reconcile(
    catalog: &OptInCatalog,
    rates: &RatesResponse,
    visible: &[String],
    currency: CurrencyCode,
) -> Vec<OptInOption> {
    let first = rates.first_quote();
    let applied: HashSet<OptInRateId> = first
        .map(|quote| quote.adjustment_ids().collect())
        .unwrap_or_default();
    let applied_time_based: HashSet<OptInRateId> = first
        .map(|quote| quote.time_based_adjustment_ids().collect())
        .unwrap_or_default();

    catalog
        .entries()
        .filter(|(_, rate)| {
            let name = normalize_opt_in_name(&rate.name);
            visible.iter().any(|allowed| *allowed == name)
        })
        .map(|(kind, rate)| {
            let checked = match kind {
                OptInKind::Regular => applied.contains(&rate.id),
                OptInKind::TimeBased => applied_time_based.contains(&rate.id),
            };
            OptInOption {
                id: rate.id,
                name: rate.name.clone(),
                price: rate.charge_value,
                price_formatted: Price::new(rate.charge_value, currency).display(),
                kind,
                checked,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> OptInCatalog {
        serde_json::from_str(
            r#"{
                "opt_in_rates": [
                    {"id": 1, "name": "Signature Required", "charge_value": 25},
                    {"id": 2, "name": "Leave at Door", "charge_value": 0}
                ],
                "opt_in_time_based_rates": [
                    {"id": 3, "name": "Before 10AM / Saturday", "charge_value": 120.5}
                ]
            }"#,
        )
        .unwrap()
    }

    fn rates(adjustments: &str, time_based: &str) -> RatesResponse {
        serde_json::from_str(&format!(
            r#"{{"rates": [
                {{"rate": 150, "service_level": {{"code": "ECO"}},
                  "rate_adjustments": {adjustments},
                  "time_based_rate_adjustments": {time_based}}},
                {{"rate": 200, "service_level": {{"code": "ONX"}},
                  "rate_adjustments": [{{"id": 2}}]}}
            ]}}"#
        ))
        .unwrap()
    }

    fn visible(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_normalize_opt_in_name() {
        assert_eq!(normalize_opt_in_name("Signature Required"), "signature_required");
        assert_eq!(
            normalize_opt_in_name("Before 10AM / Saturday"),
            "before_10am_saturday"
        );
        assert_eq!(normalize_opt_in_name("Leave at Door"), "leave_at_door");
    }

    #[test]
    fn test_normalize_keeps_surrounding_spaces() {
        assert_eq!(normalize_opt_in_name("Leave at Door "), "leave_at_door_");
        assert_eq!(normalize_opt_in_name(" Leave   at Door"), "_leave__at_door");
    }

    #[test]
    fn test_only_listed_names_are_shown() {
        let options = reconcile(
            &catalog(),
            &rates("[]", "[]"),
            &visible(&["signature_required", "before_10am_saturday"]),
            CurrencyCode::ZAR,
        );

        let ids: Vec<i64> = options.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(options[0].kind, OptInKind::Regular);
        assert_eq!(options[1].kind, OptInKind::TimeBased);
        assert_eq!(options[1].price_formatted, "R120.50");
    }

    #[test]
    fn test_empty_list_shows_nothing() {
        let options = reconcile(&catalog(), &rates("[]", "[]"), &[], CurrencyCode::ZAR);
        assert!(options.is_empty());
    }

    #[test]
    fn test_checked_follows_first_quote_adjustments() {
        let all = visible(&["signature_required", "leave_at_door", "before_10am_saturday"]);
        let options = reconcile(
            &catalog(),
            &rates(r#"[{"id": 1}, {"charge": 5}]"#, r#"[{"id": 3}]"#),
            &all,
            CurrencyCode::ZAR,
        );

        let checked: Vec<(i64, bool)> = options
            .iter()
            .map(|o| (o.id.as_i64(), o.checked))
            .collect();
        // Id 2 is only applied on the second quote.
        assert_eq!(checked, vec![(1, true), (2, false), (3, true)]);
    }

    #[test]
    fn test_regular_adjustment_ids_do_not_check_time_based_entries() {
        let options = reconcile(
            &catalog(),
            &rates(r#"[{"id": 3}]"#, "[]"),
            &visible(&["before_10am_saturday"]),
            CurrencyCode::ZAR,
        );
        assert!(!options[0].checked);
    }

    #[test]
    fn test_no_quotes_means_nothing_checked() {
        let options = reconcile(
            &catalog(),
            &RatesResponse::default(),
            &visible(&["signature_required"]),
            CurrencyCode::ZAR,
        );
        assert_eq!(options.len(), 1);
        assert!(!options[0].checked);
    }

    #[test]
    fn test_serialized_shape() {
        let options = reconcile(
            &catalog(),
            &rates(r#"[{"id": 1}]"#, "[]"),
            &visible(&["signature_required"]),
            CurrencyCode::ZAR,
        );
        let json = serde_json::to_value(&options[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Signature Required",
                "price": 25.0,
                "price_formatted": "R25.00",
                "type": "regular",
                "checked": true
            })
        );
    }
}
