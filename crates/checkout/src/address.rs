//! Sender and receiver address resolution.
//!
//! Shoppers and shop settings carry region codes (`GP`, `WC`, ...); the
//! carrier wants region names. A [`RegionTable`] maps one to the other per
//! country.

use std::collections::HashMap;

use shiplogic_core::{Address, AddressError};
use thiserror::Error;

use crate::config::ShopAddress;
use crate::models::RatePackage;

/// Errors resolving an address.
#[derive(Debug, Error)]
pub enum AddressResolutionError {
    #[error("unknown region `{region}` for country `{country}`")]
    UnknownRegion { country: String, region: String },

    #[error(transparent)]
    Invalid(#[from] AddressError),
}

/// Region code to region name, per ISO country code.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: HashMap<String, HashMap<String, String>>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::south_africa()
    }
}

impl RegionTable {
    /// A table with only the South African provinces.
    #[must_use]
    pub fn south_africa() -> Self {
        let mut table = Self {
            regions: HashMap::new(),
        };
        table.extend(
            "ZA",
            [
                ("EC", "Eastern Cape"),
                ("FS", "Free State"),
                ("GP", "Gauteng"),
                ("KZN", "KwaZulu-Natal"),
                ("LP", "Limpopo"),
                ("MP", "Mpumalanga"),
                ("NC", "Northern Cape"),
                ("NW", "North West"),
                ("WC", "Western Cape"),
            ],
        );
        table
    }

    /// Add or replace regions for a country.
    pub fn extend<'a>(
        &mut self,
        country: &str,
        regions: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let entry = self
            .regions
            .entry(country.to_ascii_uppercase())
            .or_default();
        for (code, name) in regions {
            entry.insert(code.to_ascii_uppercase(), name.to_string());
        }
    }

    /// Look up a region name.
    ///
    /// # Errors
    ///
    /// Returns `AddressResolutionError::UnknownRegion` if the country or the
    /// code is not in the table.
    pub fn resolve(&self, country: &str, region: &str) -> Result<&str, AddressResolutionError> {
        self.regions
            .get(&country.trim().to_ascii_uppercase())
            .and_then(|regions| regions.get(&region.trim().to_ascii_uppercase()))
            .map(String::as_str)
            .ok_or_else(|| AddressResolutionError::UnknownRegion {
                country: country.to_string(),
                region: region.to_string(),
            })
    }

    /// Build the collection address from the shop settings.
    ///
    /// # Errors
    ///
    /// Returns `AddressResolutionError` if the shop's region is unknown or a
    /// required field is blank.
    pub fn resolve_sender(&self, shop: &ShopAddress) -> Result<Address, AddressResolutionError> {
        let zone = self.resolve(&shop.country, &shop.state)?;
        let street_address = match shop.suburb.as_deref() {
            Some(suburb) if !suburb.is_empty() => format!("{}, {suburb}", shop.address_1),
            _ => shop.address_1.clone(),
        };

        Ok(Address::builder()
            .contact_name(shop.contact_name.clone().unwrap_or_default())
            .company(shop.company_name.clone().unwrap_or_default())
            .street_address(street_address)
            .local_area(shop.address_2.clone().unwrap_or_default())
            .city(&shop.city)
            .zone(zone)
            .country(&shop.country)
            .postal_code(&shop.postal_code)
            .build()?)
    }

    /// Build the delivery address from the package destination.
    ///
    /// # Errors
    ///
    /// Returns `AddressResolutionError` if the destination region is unknown
    /// or a required field is blank.
    pub fn resolve_receiver(
        &self,
        package: &RatePackage,
    ) -> Result<Address, AddressResolutionError> {
        let destination = &package.destination;
        let zone = self.resolve(&destination.country, &destination.state)?;

        Ok(Address::builder()
            .company(package.billing_company.clone().unwrap_or_default())
            .street_address(&destination.address)
            .local_area(&destination.address_2)
            .city(&destination.city)
            .zone(zone)
            .country(&destination.country)
            .postal_code(&destination.postcode)
            .build()?)
    }
}
