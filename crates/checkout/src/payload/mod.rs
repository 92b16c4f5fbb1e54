//! Builds the carrier's parcel list from cart contents.

pub mod packing;
pub mod units;

use rust_decimal::Decimal;
use shiplogic_core::{Parcel, ParcelError};
use thiserror::Error;
use tracing::debug;

use crate::models::CartLine;
pub use packing::{BoxSize, PackedContents, PackedEntry};
pub use units::{DimensionUnit, WeightUnit};

/// Errors building parcels.
#[derive(Debug, Error)]
pub enum PayloadBuildError {
    #[error("product `{product}` has no {field}")]
    MissingDimension {
        product: String,
        field: &'static str,
    },

    #[error("product `{product}` is too large to ship")]
    Oversize { product: String },

    #[error("the package has more than {max} units")]
    TooManyUnits { max: u32 },

    #[error("packed entry {index} has neither an item count nor an item")]
    MissingItemCount { index: usize },

    #[error("the package has no items to ship")]
    EmptyPackage,

    #[error(transparent)]
    InvalidParcel(#[from] ParcelError),
}

/// Store settings that drive packing.
#[derive(Debug, Clone, Default)]
pub struct PackingSettings {
    pub weight_unit: WeightUnit,
    pub dimension_unit: DimensionUnit,
    pub parcel_sizes: Vec<BoxSize>,
    pub flyer_size: Option<BoxSize>,
}

/// Build the parcel list for a cart.
///
/// # Errors
///
/// Returns `PayloadBuildError` if a line lacks dimensions, the cart is
/// empty, or a packed entry does not make a valid parcel.
pub fn build_parcels(
    settings: &PackingSettings,
    contents: &[CartLine],
) -> Result<Vec<Parcel>, PayloadBuildError> {
    let packed = packing::pack(contents, settings)?;
    debug!(
        entries = packed.entries.len(),
        fits_flyer = packed.fits_flyer,
        "Packed cart contents"
    );

    if packed.entries.is_empty() {
        return Err(PayloadBuildError::EmptyPackage);
    }

    packed
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parcel_from_entry(index, entry, settings.weight_unit))
        .collect()
}

fn parcel_from_entry(
    index: usize,
    entry: &PackedEntry,
    weight_unit: WeightUnit,
) -> Result<Parcel, PayloadBuildError> {
    let item_count = entry
        .item_count
        .or(entry.item)
        .ok_or(PayloadBuildError::MissingItemCount { index })?;

    let description = remove_trailing_comma(&entry.description);
    let weight_kg = weight_unit
        .to_kg(entry.actual_mass)
        .ok_or_else(|| PayloadBuildError::Oversize {
            product: description.to_string(),
        })?;

    Ok(Parcel::new(
        entry.dim1,
        entry.dim2,
        entry.dim3,
        description,
        item_count,
        weight_kg.max(Decimal::ZERO),
    )?)
}

/// Cut the string at the last `", "`.
///
/// `"Book, Pen, "` becomes `"Book, Pen"`; strings without the separator are
/// returned unchanged.
#[must_use]
pub fn remove_trailing_comma(value: &str) -> &str {
    value.rfind(", ").map_or(value, |index| &value[..index])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn book(quantity: u32) -> CartLine {
        CartLine {
            product_id: "1".to_string(),
            name: "Book".to_string(),
            quantity,
            weight: Some(Decimal::new(500, 0)),
            length: Some(Decimal::new(20, 0)),
            width: Some(Decimal::new(15, 0)),
            height: Some(Decimal::new(3, 0)),
            single_parcel: false,
        }
    }

    #[test]
    fn test_remove_trailing_comma() {
        assert_eq!(remove_trailing_comma("Book, Pen, "), "Book, Pen");
        assert_eq!(remove_trailing_comma("Book"), "Book");
        assert_eq!(remove_trailing_comma("Book, "), "Book");
        assert_eq!(remove_trailing_comma(""), "");
    }

    #[test]
    fn test_weight_normalised_to_kg() {
        let settings = PackingSettings {
            weight_unit: WeightUnit::G,
            ..PackingSettings::default()
        };

        let parcels = build_parcels(&settings, &[book(1)]).unwrap();

        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].weight_kg(), Decimal::new(5, 1));
        assert_eq!(parcels[0].description(), "Book");
        assert_eq!(parcels[0].item_count(), 1);
    }

    #[test]
    fn test_item_count_falls_back_to_item() {
        let entry = PackedEntry {
            dim1: Decimal::TEN,
            dim2: Decimal::TEN,
            dim3: Decimal::TEN,
            description: "TV, ".to_string(),
            item_count: None,
            item: Some(1),
            actual_mass: Decimal::ONE,
        };

        let parcel = parcel_from_entry(0, &entry, WeightUnit::Kg).unwrap();
        assert_eq!(parcel.item_count(), 1);
        assert_eq!(parcel.description(), "TV");
    }

    #[test]
    fn test_entry_without_any_count_is_rejected() {
        let entry = PackedEntry {
            dim1: Decimal::TEN,
            dim2: Decimal::TEN,
            dim3: Decimal::TEN,
            description: "TV, ".to_string(),
            item_count: None,
            item: None,
            actual_mass: Decimal::ONE,
        };

        let err = parcel_from_entry(4, &entry, WeightUnit::Kg).unwrap_err();
        assert!(matches!(err, PayloadBuildError::MissingItemCount { index: 4 }));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let err = build_parcels(&PackingSettings::default(), &[book(0)]).unwrap_err();
        assert!(matches!(err, PayloadBuildError::EmptyPackage));
    }

    #[test]
    fn test_missing_dimensions_are_not_defaulted() {
        let mut line = book(1);
        line.length = None;

        let err = build_parcels(&PackingSettings::default(), &[line]).unwrap_err();
        assert_eq!(err.to_string(), "product `Book` has no length");
    }
}
