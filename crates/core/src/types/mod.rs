//! Core types for ShipLogic rate quoting.
//!
//! This module provides type-safe wrappers for the carrier's domain concepts.

pub mod address;
pub mod id;
pub mod opt_in;
pub mod parcel;
pub mod pickup_point;
pub mod price;
pub mod rate;

pub use address::{Address, AddressBuilder, AddressError};
pub use id::*;
pub use opt_in::{OptInCatalog, OptInKind, OptInRate};
pub use parcel::{Parcel, ParcelError};
pub use pickup_point::{PickupPoint, PickupPointAddress, PickupPointId, PickupPointsResponse};
pub use price::{CurrencyCode, Price};
pub use rate::{
    Destination, OptInRateRequest, RateAdjustment, RateQuote, RatesResponse, ServiceLevel,
    ShipmentRateRequest,
};
