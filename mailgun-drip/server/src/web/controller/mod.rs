mod campaign;
mod error;
mod webhook;

use axum::{routing, Extension, Router};
use drip_axum::response::EncapsulatedJson;
use mailgun_drip_core::ServerInfo;

pub use self::error::{Error, Result};
use crate::ServiceState;

pub fn api_v1_router(service_state: &ServiceState) -> Router {
    let routes = Router::new()
        .route("/v1/info", routing::get(server_info))
        .route("/v1/webhooks/mailgun", routing::post(webhook::mailgun_webhook))
        .route("/v1/campaigns", routing::post(campaign::start_campaign))
        .route("/v1/unsubscribes", routing::post(campaign::unsubscribe));

    Router::new().nest("/api", routes).with_state(service_state.clone())
}

/// Get server info
pub async fn server_info(
    Extension(server_info): Extension<ServerInfo>,
) -> Result<EncapsulatedJson<ServerInfo>> {
    Ok(EncapsulatedJson::ok(server_info))
}
