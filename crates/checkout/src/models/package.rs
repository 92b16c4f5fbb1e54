//! The shipping package the checkout flow asks us to quote.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cart line as the checkout flow reports it.
///
/// Weight and dimensions are in the store's configured units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(default)]
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub length: Option<Decimal>,
    #[serde(default)]
    pub width: Option<Decimal>,
    #[serde(default)]
    pub height: Option<Decimal>,
    /// Ship every unit of this product in its own box.
    #[serde(default)]
    pub single_parcel: bool,
}

/// The shopper's shipping destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDestination {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address_2: String,
    pub city: String,
    /// Region code, e.g. `GP`.
    pub state: String,
    /// ISO country code.
    pub country: String,
    #[serde(default)]
    pub postcode: String,
}

/// One shipping package to quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePackage {
    pub destination: PackageDestination,
    pub contents: Vec<CartLine>,
    #[serde(default)]
    pub cart_subtotal: Option<Decimal>,
    #[serde(default)]
    pub contents_cost: Option<Decimal>,
    #[serde(default)]
    pub billing_company: Option<String>,
}
