//! ShipLogic carrier API client.
//!
//! # Architecture
//!
//! - One static operation table ([`Operation`]) maps each carrier call to an
//!   HTTP method and a path under the API base
//! - Two API generations: the current base (`/v2/`) authenticated with a
//!   bearer token, and the legacy unversioned base authenticated with AWS
//!   Signature V4 (`execute-api`, `af-south-1`)
//! - The auth mode is picked per request from whether a bearer token is
//!   configured; there is no fallback between modes within a call
//! - Single attempt per call, no retries
//!
//! Callers depend on the [`CarrierTransport`] trait so the rate orchestrator
//! can be driven by a scripted transport in tests.

mod client;
pub mod shipments;
pub mod signing;

pub use client::CarrierClient;

use std::fmt;
use std::future::Future;

use reqwest::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Current, versioned API base (bearer token auth).
pub const API_BASE: &str = "https://api.shiplogic.com/v2/";

/// Legacy, unversioned API base (signed requests).
pub const LEGACY_API_BASE: &str = "https://api.shiplogic.com/";

/// Errors that can occur when talking to the carrier.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The carrier answered with a non-success status.
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload shape does not match the operation's HTTP method.
    #[error("invalid request: {operation} is a {method} operation")]
    InvalidRequest {
        operation: Operation,
        method: Method,
    },

    /// The endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// A header or signature could not be produced.
    #[error("signing error: {0}")]
    Signing(String),
}

/// A carrier API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetRates,
    GetOptInRates,
    CreateShipment,
    GetShipments,
    TrackShipment,
    GetShipmentLabel,
    GetLockerLocations,
}

impl Operation {
    /// Method name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetRates => "getRates",
            Self::GetOptInRates => "getOptInRates",
            Self::CreateShipment => "createShipment",
            Self::GetShipments => "getShipments",
            Self::TrackShipment => "trackShipment",
            Self::GetShipmentLabel => "getShipmentLabel",
            Self::GetLockerLocations => "getLockerLocations",
        }
    }

    /// HTTP method of the operation.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::GetRates | Self::GetOptInRates | Self::CreateShipment => Method::POST,
            Self::GetShipments
            | Self::TrackShipment
            | Self::GetShipmentLabel
            | Self::GetLockerLocations => Method::GET,
        }
    }

    /// Endpoint path relative to the API base. GET paths end with the query
    /// parameter name the caller's value is appended to.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::GetRates => "rates",
            Self::GetOptInRates => "rates/opt-in",
            Self::CreateShipment => "shipments",
            Self::GetShipments => "shipments?tracking_ref=",
            Self::TrackShipment => "shipments?tracking_reference=",
            Self::GetShipmentLabel => "shipments/label?id=",
            Self::GetLockerLocations => "pickup-points?order_closest=true&search=",
        }
    }

    /// Full endpoint under the given API base.
    #[must_use]
    pub fn endpoint(self, base: &str) -> String {
        format!("{base}{}", self.path())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What is sent with a call: a JSON body (POST) or a query value (GET).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarrierPayload {
    Body(String),
    Query(String),
}

/// How a request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer` against the current API base.
    Bearer,
    /// AWS Signature V4 against the legacy API base.
    SignedLegacy,
}

impl AuthMode {
    /// Pick the auth mode from the configured bearer token.
    #[must_use]
    pub fn for_token(bearer_token: Option<&str>) -> Self {
        match bearer_token {
            Some(token) if !token.trim().is_empty() => Self::Bearer,
            _ => Self::SignedLegacy,
        }
    }

    /// API base this mode talks to.
    #[must_use]
    pub const fn api_base(self) -> &'static str {
        match self {
            Self::Bearer => API_BASE,
            Self::SignedLegacy => LEGACY_API_BASE,
        }
    }
}

/// Sends raw calls to the carrier.
///
/// Implemented by [`CarrierClient`] for real HTTP traffic.
pub trait CarrierTransport: Send + Sync {
    /// Send one call and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError` on transport failure, non-success status, or a
    /// payload that does not match the operation's method.
    fn send(
        &self,
        operation: Operation,
        payload: CarrierPayload,
    ) -> impl Future<Output = Result<String, CarrierError>> + Send;
}

/// Decode a raw carrier response body.
///
/// # Errors
///
/// Returns `CarrierError::Parse` if the body is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CarrierError> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %raw.chars().take(500).collect::<String>(),
            "Failed to parse carrier response"
        );
        CarrierError::Parse(e)
    })
}
