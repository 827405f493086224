use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WebConfig {
    #[serde(default = "WebConfig::default_listen_address")]
    pub listen_address: SocketAddr,
}

impl WebConfig {
    #[inline]
    pub const fn default_listen_address() -> SocketAddr {
        SocketAddr::new(mailgun_drip_core::DEFAULT_WEB_HOST, mailgun_drip_core::DEFAULT_WEB_PORT)
    }
}

impl Default for WebConfig {
    fn default() -> Self { Self { listen_address: Self::default_listen_address() } }
}

impl From<WebConfig> for mailgun_drip_core::config::WebConfig {
    fn from(WebConfig { listen_address }: WebConfig) -> Self { Self { listen_address } }
}
