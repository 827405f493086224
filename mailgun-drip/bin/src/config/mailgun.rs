use std::time::Duration;

use mailgun_drip_core::SchedulerOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MailgunConfig {
    pub api_key: Option<String>,

    pub domain: Option<String>,

    #[serde(default = "MailgunConfig::default_host")]
    pub host: String,

    #[serde(default = "MailgunConfig::default_protocol")]
    pub protocol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default = "MailgunConfig::default_endpoint")]
    pub endpoint: String,

    // Falls back to `api_key` when not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_signing_key: Option<String>,

    #[serde(default = "MailgunConfig::default_validate_webhooks")]
    pub validate_webhooks: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl MailgunConfig {
    #[inline]
    pub fn default_host() -> String { "api.mailgun.net".to_string() }

    #[inline]
    pub fn default_protocol() -> String { "https".to_string() }

    #[inline]
    pub fn default_endpoint() -> String { "/v3".to_string() }

    #[inline]
    pub const fn default_validate_webhooks() -> bool { true }
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            domain: None,
            host: Self::default_host(),
            protocol: Self::default_protocol(),
            port: None,
            endpoint: Self::default_endpoint(),
            webhook_signing_key: None,
            validate_webhooks: Self::default_validate_webhooks(),
            timeout_secs: None,
        }
    }
}

impl From<MailgunConfig> for SchedulerOptions {
    fn from(
        MailgunConfig {
            api_key,
            domain,
            host,
            protocol,
            port,
            endpoint,
            webhook_signing_key,
            validate_webhooks,
            timeout_secs,
        }: MailgunConfig,
    ) -> Self {
        Self {
            api_key,
            domain,
            host: Some(host),
            protocol: Some(protocol),
            port,
            endpoint: Some(endpoint),
            webhook_signing_key,
            validate_webhooks,
            timeout: timeout_secs.map(Duration::from_secs),
        }
    }
}
