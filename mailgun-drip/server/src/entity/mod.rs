use mail_transport::Message;
use mailgun_drip_core::{CustomVars, WebhookOutcome};
use serde::{Deserialize, Serialize};

/// Request to start the configured campaign for one recipient
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCampaignRequest {
    pub to: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,

    /// Carried on every stage and echoed back by delivery webhooks
    #[serde(default, skip_serializing_if = "CustomVars::is_empty")]
    pub custom_vars: CustomVars,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StartCampaignResponse {
    pub stage: usize,

    pub message: Message,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnsubscribeRequest {
    pub address: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnsubscribeResponse {
    pub address: String,

    pub unsubscribed: bool,
}

/// What the receiver did with a delivery webhook
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WebhookResponse {
    /// The next stage was sent
    Advanced { stage: usize, message: Message },

    /// The campaign has no further stage for this recipient
    Finished { stage: Option<usize> },

    /// The same delivery event was already handled
    Duplicate,
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Advanced { stage, message } => Self::Advanced { stage, message },
            WebhookOutcome::Finished { stage } => Self::Finished { stage },
        }
    }
}
