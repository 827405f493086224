use axum::{extract::State, Json};
use drip_axum::response::EncapsulatedJson;
use mailgun_drip_core::WebhookPayload;

use crate::{
    entity::WebhookResponse, web::controller::Result, ServiceState, WebhookDeduplicator,
};

/// Receive a Mailgun delivery webhook and send the next stage, if any
///
/// A redelivered event is acknowledged without sending when de-duplication
/// is enabled. Only signed events claim a de-duplication key, and the key is
/// released again when handling fails so that the provider's retry is
/// processed.
pub async fn mailgun_webhook(
    State(state): State<ServiceState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<EncapsulatedJson<WebhookResponse>> {
    let Some(deduplicator) = &state.deduplicator else {
        let outcome = state.scheduler.handle_webhook(&state.campaign.campaign, &payload).await?;
        return Ok(EncapsulatedJson::ok(outcome.into()));
    };

    state.scheduler.verify_webhook(&payload).await?;

    let key = WebhookDeduplicator::key(&payload);
    if let Some(key) = &key {
        if !deduplicator.claim(key).await {
            tracing::info!("Ignoring duplicated webhook");
            return Ok(EncapsulatedJson::ok(WebhookResponse::Duplicate));
        }
    }

    match state.scheduler.handle_verified_webhook(&state.campaign.campaign, &payload).await {
        Ok(outcome) => Ok(EncapsulatedJson::ok(outcome.into())),
        Err(err) => {
            if let Some(key) = &key {
                deduplicator.release(key).await;
            }
            Err(err.into())
        }
    }
}
