//! ShipLogic Core - Shared types library.
//!
//! This crate provides the domain types used across all components:
//! - `checkout` - Rate orchestration service and REST surface
//! - `cli` - Command-line tools for quotes, tracking and migrations
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no caches. Field names follow the ShipLogic wire format so the
//! same structs are serialized into request bodies and cache keys.
//!
//! # Modules
//!
//! - [`types`] - Addresses, parcels, rate requests/quotes, opt-ins, pickup
//!   points, money and typed ids

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
