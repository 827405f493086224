mod dedup;
pub mod entity;
mod error;
mod web;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use mailgun_drip_core::{
    config::{Config, WebhookDedupConfig},
    Scheduler, SchedulerOptions, ServerInfo,
};
use sigfinn::{ExitStatus, LifecycleManager, Shutdown};
use snafu::ResultExt;

pub use self::{
    dedup::WebhookDeduplicator,
    error::{Error, Result},
    web::{controller, router, ServiceState},
};

/// # Errors
/// Returns errors when server fails to start
pub async fn serve_with_shutdown(config: Config, server_info: ServerInfo) -> Result<()> {
    let Config { web, scheduler, campaign, webhook_dedup } = config;

    let scheduler = initialize_scheduler(scheduler)?;

    let deduplicator = initialize_deduplicator(&webhook_dedup);

    let service_state = ServiceState::new(scheduler, campaign, deduplicator.clone());

    let lifecycle_manager = LifecycleManager::<Error>::new();

    let _handle = lifecycle_manager.spawn(
        "Http Server",
        create_web_http_server_future(web.listen_address, service_state, server_info),
    );

    if let Some(deduplicator) = deduplicator {
        let _handle = lifecycle_manager.spawn(
            "Webhook de-duplication sweeper",
            create_dedup_sweeper_future(deduplicator, webhook_dedup.ttl),
        );
    }

    if let Ok(Err(err)) = lifecycle_manager.serve().await {
        tracing::error!("{err}");
        Err(err)
    } else {
        Ok(())
    }
}

#[tracing::instrument(
    skip(options),
    fields(
        domain = ?options.domain,
        validate_webhooks = options.validate_webhooks
    )
)]
fn initialize_scheduler(options: SchedulerOptions) -> Result<Scheduler> {
    tracing::info!("Initializing Mailgun scheduler");

    if !options.validate_webhooks {
        tracing::warn!("Webhook signature validation is disabled");
    }

    Scheduler::new(options).context(error::InitializeSchedulerSnafu)
}

fn initialize_deduplicator(config: &WebhookDedupConfig) -> Option<Arc<WebhookDeduplicator>> {
    if !config.enable {
        return None;
    }

    tracing::info!(ttl = ?config.ttl, "Webhook de-duplication is enabled");
    Some(Arc::new(WebhookDeduplicator::new(config.ttl)))
}

fn create_web_http_server_future(
    listen_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |shutdown_signal| {
        async move {
            tracing::info!("Listen Web HTTP server endpoint on {listen_address}");

            let result =
                web::new_api_server(listen_address, service_state, server_info, shutdown_signal)
                    .await;

            match result {
                Ok(()) => {
                    tracing::info!("HTTP server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}

fn create_dedup_sweeper_future(
    deduplicator: Arc<WebhookDeduplicator>,
    ttl: Duration,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |shutdown_signal| {
        async move {
            let mut interval = tokio::time::interval(ttl.max(Duration::from_secs(1)));
            tokio::pin!(shutdown_signal);

            loop {
                tokio::select! {
                    () = &mut shutdown_signal => break,
                    _ = interval.tick() => {
                        let purged = deduplicator.purge_expired().await;
                        if purged > 0 {
                            tracing::debug!(purged, "Purged expired webhook keys");
                        }
                    }
                }
            }

            tracing::info!("Webhook de-duplication sweeper is shut down gracefully");
            ExitStatus::Success
        }
        .boxed()
    }
}
