//! AWS Signature Version 4 for the legacy ShipLogic API.
//!
//! The legacy API sits behind API Gateway and expects requests signed with
//! the account's access key id and secret, scoped to `execute-api` in
//! `af-south-1`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use url::Url;

use super::CarrierError;

/// Service name in the credential scope.
pub const SERVICE: &str = "execute-api";

/// Region in the credential scope.
pub const REGION: &str = "af-south-1";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// `X-Amz-Date` timestamp format.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// The parts of an HTTP request that are covered by the signature.
#[derive(Debug)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    /// Headers to sign, excluding `host` (derived from the URL).
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
}

/// Signs requests with AWS Signature V4.
#[derive(Clone)]
pub struct SigV4Signer {
    access_key_id: String,
    secret_access_key: SecretString,
    service: String,
    region: String,
}

impl std::fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigV4Signer")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("service", &self.service)
            .field("region", &self.region)
            .finish()
    }
}

impl SigV4Signer {
    /// Create a signer for an arbitrary service scope.
    #[must_use]
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: SecretString,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key,
            service: service.into(),
            region: region.into(),
        }
    }

    /// Create a signer scoped to the ShipLogic legacy API.
    #[must_use]
    pub fn shiplogic(access_key_id: impl Into<String>, secret_access_key: SecretString) -> Self {
        Self::new(access_key_id, secret_access_key, SERVICE, REGION)
    }

    /// Compute the `Authorization` header value for a request.
    ///
    /// `timestamp` must be the same instant sent in `X-Amz-Date`.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Signing` if the HMAC key cannot be initialised
    /// or the URL has no host.
    pub fn authorization(
        &self,
        request: &SignableRequest<'_>,
        timestamp: DateTime<Utc>,
    ) -> Result<String, CarrierError> {
        let amz_date = timestamp.format(AMZ_DATE_FORMAT).to_string();
        let date = timestamp.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);

        let (canonical, signed_headers) = canonical_request(request)?;
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical.as_bytes()))
        );

        let key = self.signing_key(&date)?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key_id
        ))
    }

    /// Derive the per-day signing key.
    fn signing_key(&self, date: &str) -> Result<Vec<u8>, CarrierError> {
        let secret = format!("AWS4{}", self.secret_access_key.expose_secret());
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        hmac_sha256(&k_service, b"aws4_request")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CarrierError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| CarrierError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Build the canonical request and the signed-headers list.
fn canonical_request(request: &SignableRequest<'_>) -> Result<(String, String), CarrierError> {
    let host = request
        .url
        .host_str()
        .ok_or_else(|| CarrierError::Signing("URL has no host".to_string()))?;
    let host = match request.url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), normalize_header_value(value)))
        .filter(|(name, _)| name != "host")
        .collect();
    headers.push(("host".to_string(), host));
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical = format!(
        "{}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{}",
        request.method.to_ascii_uppercase(),
        canonical_uri(request.url),
        canonical_query(request.url),
        hex::encode(Sha256::digest(request.body))
    );

    Ok((canonical, signed_headers))
}

/// Path with every segment encoded again (non-S3 services double-encode).
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Query pairs encoded and sorted by key, then value.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (uri_encode(&key), uri_encode(&value)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 encoding: everything except unreserved characters.
fn uri_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Trim and collapse internal whitespace runs to a single space.
fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
