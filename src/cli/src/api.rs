//! Client for the node's administrative REST API.

use crate::config::InitConfig;
use crate::errors::WalletError;
use reqwest::{Certificate, Client, Url};
use std::error::Error as StdError;
use tracing::{debug, info, warn};
use walletinit_core::{Mnemonic, WalletInitRequest, WalletInitResult};

/// Talks to the `initwallet` endpoint.
#[derive(Debug, Clone)]
pub struct AdminClient {
    /// The HTTP client
    client: Client,
    /// The `initwallet` endpoint
    endpoint: Url,
}

impl AdminClient {
    /// Builds a client from the configuration.
    pub fn new(config: &InitConfig) -> Result<Self, WalletError> {
        let endpoint = config.validate()?;

        let mut builder = Client::builder().timeout(config.request_timeout());

        if let Some(cert_path) = &config.tls_cert {
            let pem = std::fs::read(cert_path)?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                WalletError::ConfigError(format!(
                    "invalid certificate {}: {}",
                    cert_path.display(),
                    e
                ))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for {}", endpoint);
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| WalletError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Gets the endpoint this client posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the node to create a wallet and returns the generated recovery words.
    pub async fn init_wallet(&self, request: &WalletInitRequest) -> Result<Mnemonic, WalletError> {
        info!("Posting wallet initialization request to {}", self.endpoint);
        debug!("Request: {:?}", request);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| WalletError::TransportError(error_chain(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WalletError::TransportError(error_chain(&e)))?;
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(WalletError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let result: WalletInitResult = serde_json::from_str(&body)
            .map_err(|e| WalletError::InvalidResponse(format!("failed to parse body: {}", e)))?;

        result
            .into_mnemonic()
            .map_err(|e| WalletError::InvalidResponse(e.to_string()))
    }
}

/// Flattens an error and its sources into one line.
///
/// reqwest's top-level message ("error sending request") hides the reason,
/// such as a refused connection, in the source chain.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
