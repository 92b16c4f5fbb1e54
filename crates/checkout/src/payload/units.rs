//! Store measurement units and their conversion to kg / cm.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// A unit string that is not one of the supported units.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} unit: {value}")]
pub struct UnknownUnit {
    pub kind: &'static str,
    pub value: String,
}

/// Weight unit configured for the store's products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightUnit {
    #[default]
    Kg,
    G,
    Lbs,
    Oz,
}

impl WeightUnit {
    /// Kilograms per one of this unit.
    fn kg_factor(self) -> Decimal {
        match self {
            Self::Kg => Decimal::ONE,
            Self::G => Decimal::new(1, 3),
            // 453.4 g
            Self::Lbs => Decimal::new(4534, 4),
            // 28.3495 g
            Self::Oz => Decimal::new(283_495, 7),
        }
    }

    /// Convert a value in this unit to kilograms. `None` on overflow.
    #[must_use]
    pub fn to_kg(self, value: Decimal) -> Option<Decimal> {
        value.checked_mul(self.kg_factor())
    }

    /// Convert kilograms to this unit, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn from_kg(self, kg: Decimal) -> Decimal {
        kg.checked_div(self.kg_factor()).unwrap_or(Decimal::MAX)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::G => "g",
            Self::Lbs => "lbs",
            Self::Oz => "oz",
        }
    }
}

impl FromStr for WeightUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "g" => Ok(Self::G),
            "lbs" | "lb" => Ok(Self::Lbs),
            "oz" => Ok(Self::Oz),
            _ => Err(UnknownUnit {
                kind: "weight",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension unit configured for the store's products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DimensionUnit {
    #[default]
    Cm,
    M,
    Mm,
    In,
}

impl DimensionUnit {
    /// Convert a value in this unit to centimetres. `None` on overflow.
    #[must_use]
    pub fn to_cm(self, value: Decimal) -> Option<Decimal> {
        match self {
            Self::Cm => Some(value),
            Self::M => value.checked_mul(Decimal::ONE_HUNDRED),
            Self::Mm => value.checked_div(Decimal::TEN),
            Self::In => value.checked_mul(Decimal::new(254, 2)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::M => "m",
            Self::Mm => "mm",
            Self::In => "in",
        }
    }
}

impl FromStr for DimensionUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cm" => Ok(Self::Cm),
            "m" => Ok(Self::M),
            "mm" => Ok(Self::Mm),
            "in" => Ok(Self::In),
            _ => Err(UnknownUnit {
                kind: "dimension",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DimensionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
