//! Request and session models for the checkout service.

pub mod package;
pub mod session;

pub use package::{CartLine, PackageDestination, RatePackage};
pub use session::{SelectedOptIns, keys as session_keys};

use serde::{Deserialize, Deserializer};
use shiplogic_core::OptInRateId;

/// Deserialize opt-in ids sent as numbers or numeric strings.
///
/// A missing or `null` list is empty.
///
/// # Errors
///
/// Fails on values that are neither integers nor integer strings.
pub fn deserialize_opt_in_ids<'de, D>(deserializer: D) -> Result<Vec<OptInRateId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    let raw: Option<Vec<RawId>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|id| match id {
            RawId::Number(n) => Ok(OptInRateId::new(n)),
            RawId::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(OptInRateId::new)
                .map_err(|_| serde::de::Error::custom(format!("invalid opt-in id `{s}`"))),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_opt_in_ids")]
        ids: Vec<OptInRateId>,
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let body: Body = serde_json::from_str(r#"{"ids": [1, "2", " 3 "]}"#).unwrap();
        assert_eq!(
            body.ids,
            vec![OptInRateId::new(1), OptInRateId::new(2), OptInRateId::new(3)]
        );
    }

    #[test]
    fn test_missing_and_null_are_empty() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.ids.is_empty());

        let body: Body = serde_json::from_str(r#"{"ids": null}"#).unwrap();
        assert!(body.ids.is_empty());
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        assert!(serde_json::from_str::<Body>(r#"{"ids": ["abc"]}"#).is_err());
    }
}
