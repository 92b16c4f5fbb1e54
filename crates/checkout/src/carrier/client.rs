//! HTTP implementation of [`CarrierTransport`].

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument};
use url::Url;

use super::signing::{AMZ_DATE_FORMAT, SigV4Signer, SignableRequest};
use super::{AuthMode, CarrierError, CarrierPayload, CarrierTransport, Operation};
use crate::config::CarrierConfig;

const CONTENT_TYPE: &str = "application/json";

/// Client for the ShipLogic REST API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct CarrierClient {
    inner: Arc<CarrierClientInner>,
}

struct CarrierClientInner {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    signer: Option<SigV4Signer>,
    api_base: String,
    legacy_api_base: String,
    log_payloads: bool,
}

impl std::fmt::Debug for CarrierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierClient")
            .field("auth_mode", &self.auth_mode())
            .field("api_base", &self.inner.api_base)
            .field("legacy_api_base", &self.inner.legacy_api_base)
            .finish_non_exhaustive()
    }
}

impl CarrierClient {
    /// Create a new carrier client.
    #[must_use]
    pub fn new(config: &CarrierConfig) -> Self {
        let signer = config
            .access_key_id
            .as_ref()
            .zip(config.secret_access_key.as_ref())
            .map(|(key_id, secret)| SigV4Signer::shiplogic(key_id.clone(), secret.clone()));

        Self {
            inner: Arc::new(CarrierClientInner {
                client: reqwest::Client::new(),
                api_key: config.api_key.clone(),
                signer,
                api_base: config.api_base.clone(),
                legacy_api_base: config.legacy_api_base.clone(),
                log_payloads: config.log_payloads,
            }),
        }
    }

    /// The auth mode the next request will use.
    #[must_use]
    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::for_token(self.inner.api_key.as_ref().map(ExposeSecret::expose_secret))
    }

    /// Build the endpoint URL for an operation and payload.
    fn endpoint(
        &self,
        mode: AuthMode,
        operation: Operation,
        payload: &CarrierPayload,
    ) -> Result<Url, CarrierError> {
        let base = match mode {
            AuthMode::Bearer => &self.inner.api_base,
            AuthMode::SignedLegacy => &self.inner.legacy_api_base,
        };
        let mut endpoint = operation.endpoint(base);

        let method = operation.method();
        match payload {
            CarrierPayload::Query(value) if method == Method::GET => {
                endpoint.push_str(&urlencoding::encode(value));
            }
            CarrierPayload::Body(_) if method == Method::POST => {}
            _ => return Err(CarrierError::InvalidRequest { operation, method }),
        }

        Ok(Url::parse(&endpoint)?)
    }

    fn log_payload(&self, operation: Operation, direction: &str, payload: &str) {
        if self.inner.log_payloads {
            info!(operation = %operation, direction, payload, "Carrier payload");
        } else {
            debug!(operation = %operation, direction, payload, "Carrier payload");
        }
    }

    #[instrument(skip(self, payload), fields(operation = %operation))]
    async fn execute(
        &self,
        operation: Operation,
        payload: CarrierPayload,
    ) -> Result<String, CarrierError> {
        let mode = self.auth_mode();
        let url = self.endpoint(mode, operation, &payload)?;
        let method = operation.method();
        let body = match payload {
            CarrierPayload::Body(body) => {
                self.log_payload(operation, "request", &body);
                body
            }
            CarrierPayload::Query(_) => String::new(),
        };

        let now = Utc::now();
        let amz_date = now.format(AMZ_DATE_FORMAT).to_string();

        let mut request = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .header("X-Amz-Date", &amz_date)
            .header("Content-Type", CONTENT_TYPE);

        request = match mode {
            AuthMode::Bearer => {
                let token = self
                    .inner
                    .api_key
                    .as_ref()
                    .map(ExposeSecret::expose_secret)
                    .unwrap_or_default();
                request.bearer_auth(token)
            }
            AuthMode::SignedLegacy => {
                let signer = self.inner.signer.as_ref().ok_or_else(|| {
                    CarrierError::Signing("no API key or access key pair configured".to_string())
                })?;
                let authorization = signer.authorization(
                    &SignableRequest {
                        method: method.as_str(),
                        url: &url,
                        headers: &[("X-Amz-Date", &amz_date), ("Content-Type", CONTENT_TYPE)],
                        body: body.as_bytes(),
                    },
                    now,
                )?;
                request.header("Authorization", authorization)
            }
        };

        if method == Method::POST {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "ShipLogic API returned non-success status"
            );
            return Err(CarrierError::Api {
                operation,
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        self.log_payload(operation, "response", &response_text);
        Ok(response_text)
    }
}

impl CarrierTransport for CarrierClient {
    async fn send(
        &self,
        operation: Operation,
        payload: CarrierPayload,
    ) -> Result<String, CarrierError> {
        self.execute(operation, payload).await
    }
}
