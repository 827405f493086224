//! Mailgun HTTP API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{error, signature, Error, MailTransport, Message, SendResponse};

/// Username Mailgun expects for HTTP basic authentication.
const API_USER: &str = "api";

/// Configuration for the Mailgun client.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Private API key.
    pub api_key: String,

    /// Sending domain, e.g. `mg.example.com`.
    pub domain: String,

    #[serde(default = "Config::default_host")]
    pub host: String,

    #[serde(default = "Config::default_protocol")]
    pub protocol: String,

    #[serde(default)]
    pub port: Option<u16>,

    /// API path prefix, e.g. `/v3`.
    #[serde(default = "Config::default_endpoint")]
    pub endpoint: String,

    /// Key used to verify webhook signatures. Falls back to `api_key`.
    #[serde(default)]
    pub webhook_signing_key: Option<String>,

    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Config {
    #[inline]
    #[must_use]
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            domain: domain.into(),
            host: Self::default_host(),
            protocol: Self::default_protocol(),
            port: None,
            endpoint: Self::default_endpoint(),
            webhook_signing_key: None,
            timeout: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn default_host() -> String { "api.mailgun.net".to_string() }

    #[inline]
    #[must_use]
    pub fn default_protocol() -> String { "https".to_string() }

    #[inline]
    #[must_use]
    pub fn default_endpoint() -> String { "/v3".to_string() }

    /// Builds `{protocol}://{host}[:{port}]{endpoint}/{domain}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let protocol = self.protocol.trim_end_matches("://").trim_end_matches(':');
        let host = self.host.trim_end_matches('/');
        let endpoint = self.endpoint.trim_matches('/');
        let endpoint = if endpoint.is_empty() { String::new() } else { format!("/{endpoint}") };

        match self.port {
            Some(port) => format!("{protocol}://{host}:{port}{endpoint}/{}", self.domain),
            None => format!("{protocol}://{host}{endpoint}/{}", self.domain),
        }
    }
}

/// Mailgun API client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    signing_key: String,
}

impl Client {
    /// Creates a new Mailgun client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mail_transport::mailgun::{Client, Config};
    ///
    /// # fn example() -> Result<(), mail_transport::Error> {
    /// let client = Client::new(Config::new("key-xxxxxxxx", "mg.example.com"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: Config) -> Result<Self, Error> {
        let base_url = config.base_url();
        tracing::info!(base_url = %base_url, "Using Mailgun API");

        let builder = reqwest::Client::builder();
        let builder =
            if let Some(timeout) = config.timeout { builder.timeout(timeout) } else { builder };
        let http = builder.build().context(error::BuildHttpClientSnafu)?;

        let signing_key = config.webhook_signing_key.unwrap_or_else(|| config.api_key.clone());

        Ok(Self { http, base_url, api_key: config.api_key, signing_key })
    }

    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str { &self.base_url }
}

#[async_trait]
impl MailTransport for Client {
    async fn send_message(&self, message: &Message) -> Result<SendResponse, Error> {
        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .basic_auth(API_USER, Some(&self.api_key))
            .form(&message.to_form())
            .send()
            .await
            .context(error::HttpRequestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Failed to send message: {message}");
            return Err(Error::SendMessage { status: status.as_u16(), message });
        }

        let body: SendResponse = response.json().await.context(error::DecodeResponseSnafu)?;
        tracing::debug!(id = %body.id, "Mailgun accepted message");
        Ok(body)
    }

    async fn validate_webhook(&self, timestamp: i64, token: &str, signature: &str) -> bool {
        signature::verify(
            &self.signing_key,
            timestamp,
            token,
            signature,
            chrono::Utc::now().timestamp(),
            signature::DEFAULT_TOLERANCE_SECS,
        )
    }

    async fn unsubscribe(&self, address: &str) -> Result<bool, Error> {
        let response = self
            .http
            .post(format!("{}/unsubscribes", self.base_url))
            .basic_auth(API_USER, Some(&self.api_key))
            .form(&[("address", address)])
            .send()
            .await
            .context(error::HttpRequestSnafu)?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Unsubscribe {
                address: address.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(address = %address, "Unsubscribed address");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_defaults() {
        let config = Config::new("key", "mg.example.com");

        assert_eq!(config.base_url(), "https://api.mailgun.net/v3/mg.example.com");
    }

    #[test]
    fn test_base_url_with_overrides() {
        let config = Config {
            host: "api.eu.mailgun.net".to_string(),
            protocol: "http:".to_string(),
            port: Some(8080),
            endpoint: "v3/".to_string(),
            ..Config::new("key", "mg.example.com")
        };

        assert_eq!(config.base_url(), "http://api.eu.mailgun.net:8080/v3/mg.example.com");
    }

    #[test]
    fn test_signing_key_falls_back_to_api_key() {
        let client = Client::new(Config::new("key-123", "mg.example.com")).unwrap();
        assert_eq!(client.signing_key, "key-123");

        let client = Client::new(Config {
            webhook_signing_key: Some("signing-456".to_string()),
            ..Config::new("key-123", "mg.example.com")
        })
        .unwrap();
        assert_eq!(client.signing_key, "signing-456");
    }
}
