use axum::{extract::State, Json};
use drip_axum::response::EncapsulatedJson;

use crate::{
    entity::{StartCampaignRequest, StartCampaignResponse, UnsubscribeRequest, UnsubscribeResponse},
    web::controller::Result,
    ServiceState,
};

/// Start the configured campaign for a recipient by sending its first stage
pub async fn start_campaign(
    State(state): State<ServiceState>,
    Json(StartCampaignRequest { to, bcc, custom_vars }): Json<StartCampaignRequest>,
) -> Result<EncapsulatedJson<StartCampaignResponse>> {
    let params = state.campaign.email_params(to, bcc, custom_vars);
    let message = state.scheduler.start(&params).await?;

    Ok(EncapsulatedJson::ok(StartCampaignResponse { stage: 0, message }))
}

/// Unsubscribe an address from the sending domain
pub async fn unsubscribe(
    State(state): State<ServiceState>,
    Json(UnsubscribeRequest { address }): Json<UnsubscribeRequest>,
) -> Result<EncapsulatedJson<UnsubscribeResponse>> {
    let unsubscribed = state.scheduler.unsubscribe(&address).await?;

    Ok(EncapsulatedJson::ok(UnsubscribeResponse { address, unsubscribed }))
}
