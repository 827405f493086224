pub mod controller;
pub mod error;

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{extract::Request, http, routing, Extension, Router, ServiceExt};
use drip_axum::{
    json_response,
    response::{Error as ResponseError, ErrorType},
};
use mailgun_drip_core::{config::CampaignConfig, Scheduler, ServerInfo};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{normalize_path::NormalizePathLayer, trace::TraceLayer};

pub use self::error::Error;
use crate::WebhookDeduplicator;

pub async fn new_api_server<ShutdownSignal>(
    socket_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let router = NormalizePathLayer::trim_trailing_slash().layer(router(service_state, server_info));
    let service = ServiceExt::<Request>::into_make_service(router);

    let listener = TcpListener::bind(&socket_address)
        .await
        .context(error::BindTcpServerSnafu { address: socket_address })?;
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context(error::ServeHttpServerSnafu)
}

/// Every route of the receiver, with tracing and the fallback attached.
pub fn router(service_state: ServiceState, server_info: ServerInfo) -> Router {
    let middleware_stack = ServiceBuilder::new().layer(TraceLayer::new_for_http());

    Router::new()
        // For load balancer health checks
        .route("/", routing::get(controller::server_info))
        .merge(controller::api_v1_router(&service_state))
        .layer(Extension(server_info))
        .layer(middleware_stack)
        .fallback(fallback)
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn fallback(uri: http::Uri) -> axum::response::Response {
    json_response! {
        status: http::StatusCode::NOT_FOUND,
        error: ResponseError::new(ErrorType::NotFound, format!("No route for {uri}"))
    }
}

#[derive(Clone)]
pub struct ServiceState {
    pub scheduler: Scheduler,
    pub campaign: Arc<CampaignConfig>,
    pub deduplicator: Option<Arc<WebhookDeduplicator>>,
}

impl ServiceState {
    #[must_use]
    pub fn new(
        scheduler: Scheduler,
        campaign: CampaignConfig,
        deduplicator: Option<Arc<WebhookDeduplicator>>,
    ) -> Self {
        Self { scheduler, campaign: Arc::new(campaign), deduplicator }
    }
}
