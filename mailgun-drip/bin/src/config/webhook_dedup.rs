use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WebhookDedupConfig {
    #[serde(default = "WebhookDedupConfig::default_enable")]
    pub enable: bool,

    // How long a handled delivery event is remembered
    #[serde(default = "WebhookDedupConfig::default_ttl_secs")]
    pub ttl_secs: u64,
}

impl WebhookDedupConfig {
    #[inline]
    pub const fn default_enable() -> bool { false }

    // Mailgun stops retrying a failed webhook after 8 hours
    #[inline]
    pub const fn default_ttl_secs() -> u64 { 24 * 60 * 60 }
}

impl Default for WebhookDedupConfig {
    fn default() -> Self { Self { enable: Self::default_enable(), ttl_secs: Self::default_ttl_secs() } }
}

impl From<WebhookDedupConfig> for mailgun_drip_core::config::WebhookDedupConfig {
    fn from(WebhookDedupConfig { enable, ttl_secs }: WebhookDedupConfig) -> Self {
        Self { enable, ttl: Duration::from_secs(ttl_secs) }
    }
}
