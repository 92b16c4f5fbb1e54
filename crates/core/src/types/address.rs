//! Collection and delivery addresses in the carrier's wire format.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building an [`Address`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field was empty or missing.
    #[error("address field `{0}` cannot be empty")]
    MissingField(&'static str),
}

/// A postal address as the carrier expects it.
///
/// Built once per rate request for the sender (shop settings) and the
/// receiver (order destination). `zone` holds the resolved region name, not
/// the region code the shopper selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contact_name: Option<String>,
    company: String,
    street_address: String,
    local_area: String,
    city: String,
    zone: String,
    country: String,
    #[serde(rename = "code")]
    postal_code: String,
}

impl Address {
    /// Start building an address.
    #[must_use]
    pub fn builder() -> AddressBuilder {
        AddressBuilder::default()
    }

    #[must_use]
    pub fn contact_name(&self) -> Option<&str> {
        self.contact_name.as_deref()
    }

    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    #[must_use]
    pub fn street_address(&self) -> &str {
        &self.street_address
    }

    #[must_use]
    pub fn local_area(&self) -> &str {
        &self.local_area
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Region name (e.g., "Gauteng").
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// ISO 3166-1 alpha-2 country code.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

/// Builder for [`Address`].
///
/// `city`, `zone` and `country` are required; everything else defaults to an
/// empty string, matching what the carrier accepts for partial addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressBuilder {
    contact_name: Option<String>,
    company: String,
    street_address: String,
    local_area: String,
    city: String,
    zone: String,
    country: String,
    postal_code: String,
}

impl AddressBuilder {
    #[must_use]
    pub fn contact_name(mut self, value: impl Into<String>) -> Self {
        self.contact_name = Some(value.into());
        self
    }

    #[must_use]
    pub fn company(mut self, value: impl Into<String>) -> Self {
        self.company = value.into();
        self
    }

    #[must_use]
    pub fn street_address(mut self, value: impl Into<String>) -> Self {
        self.street_address = value.into();
        self
    }

    #[must_use]
    pub fn local_area(mut self, value: impl Into<String>) -> Self {
        self.local_area = value.into();
        self
    }

    #[must_use]
    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.city = value.into();
        self
    }

    #[must_use]
    pub fn zone(mut self, value: impl Into<String>) -> Self {
        self.zone = value.into();
        self
    }

    #[must_use]
    pub fn country(mut self, value: impl Into<String>) -> Self {
        self.country = value.into();
        self
    }

    #[must_use]
    pub fn postal_code(mut self, value: impl Into<String>) -> Self {
        self.postal_code = value.into();
        self
    }

    /// Validate and build the address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` if `city`, `zone` or `country` is
    /// blank.
    pub fn build(self) -> Result<Address, AddressError> {
        if self.city.trim().is_empty() {
            return Err(AddressError::MissingField("city"));
        }
        if self.zone.trim().is_empty() {
            return Err(AddressError::MissingField("zone"));
        }
        if self.country.trim().is_empty() {
            return Err(AddressError::MissingField("country"));
        }

        Ok(Address {
            contact_name: self.contact_name,
            company: self.company,
            street_address: self.street_address,
            local_area: self.local_area,
            city: self.city,
            zone: self.zone,
            country: self.country,
            postal_code: self.postal_code,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_city() {
        let result = Address::builder().zone("Gauteng").country("ZA").build();
        assert_eq!(result.unwrap_err(), AddressError::MissingField("city"));
    }

    #[test]
    fn test_receiver_omits_contact_name_on_the_wire() {
        let address = Address::builder()
            .street_address("1 Main Road")
            .city("Cape Town")
            .zone("Western Cape")
            .country("ZA")
            .postal_code("8001")
            .build()
            .unwrap();

        let json = serde_json::to_value(&address).unwrap();
        assert!(json.get("contact_name").is_none());
        assert_eq!(json["code"], "8001");
        assert_eq!(json["zone"], "Western Cape");
    }

    #[test]
    fn test_sender_keeps_contact_name() {
        let address = Address::builder()
            .contact_name("Jane")
            .city("Durban")
            .zone("KwaZulu-Natal")
            .country("ZA")
            .build()
            .unwrap();

        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["contact_name"], "Jane");
        assert_eq!(address.contact_name(), Some("Jane"));
    }
}
