//! A single packed box submitted to the carrier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Parcel`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParcelError {
    /// The parcel description is blank.
    #[error("parcel description cannot be empty")]
    EmptyDescription,
    /// The parcel contains no items.
    #[error("parcel item count must be positive")]
    NoItems,
    /// A dimension is zero or negative.
    #[error("parcel {dimension} must be positive (got {value})")]
    NonPositiveDimension {
        /// Which dimension failed.
        dimension: &'static str,
        /// The rejected value in centimetres.
        value: Decimal,
    },
    /// The weight is negative.
    #[error("parcel weight cannot be negative (got {0})")]
    NegativeWeight(Decimal),
}

/// One packed box. Dimensions are centimetres, weight is kilograms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(rename = "submitted_length_cm", with = "rust_decimal::serde::float")]
    length_cm: Decimal,
    #[serde(rename = "submitted_width_cm", with = "rust_decimal::serde::float")]
    width_cm: Decimal,
    #[serde(rename = "submitted_height_cm", with = "rust_decimal::serde::float")]
    height_cm: Decimal,
    #[serde(rename = "submitted_description")]
    description: String,
    item_count: u32,
    #[serde(rename = "submitted_weight_kg", with = "rust_decimal::serde::float")]
    weight_kg: Decimal,
}

impl Parcel {
    /// Create a validated parcel.
    ///
    /// # Errors
    ///
    /// Returns an error if the description is blank, the item count is zero,
    /// a dimension is not positive or the weight is negative.
    pub fn new(
        length_cm: Decimal,
        width_cm: Decimal,
        height_cm: Decimal,
        description: impl Into<String>,
        item_count: u32,
        weight_kg: Decimal,
    ) -> Result<Self, ParcelError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ParcelError::EmptyDescription);
        }
        if item_count == 0 {
            return Err(ParcelError::NoItems);
        }
        for (dimension, value) in [
            ("length", length_cm),
            ("width", width_cm),
            ("height", height_cm),
        ] {
            if value <= Decimal::ZERO {
                return Err(ParcelError::NonPositiveDimension { dimension, value });
            }
        }
        if weight_kg < Decimal::ZERO {
            return Err(ParcelError::NegativeWeight(weight_kg));
        }

        Ok(Self {
            length_cm,
            width_cm,
            height_cm,
            description,
            item_count,
            weight_kg,
        })
    }

    #[must_use]
    pub const fn length_cm(&self) -> Decimal {
        self.length_cm
    }

    #[must_use]
    pub const fn width_cm(&self) -> Decimal {
        self.width_cm
    }

    #[must_use]
    pub const fn height_cm(&self) -> Decimal {
        self.height_cm
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    #[must_use]
    pub const fn weight_kg(&self) -> Decimal {
        self.weight_kg
    }
}
