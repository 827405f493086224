//! The drip scheduler: sends stages and advances campaigns on delivery
//! webhooks.

use std::{sync::Arc, time::Duration};

use mail_transport::{mailgun, MailTransport, Message};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    clock::{Clock, SystemClock},
    error::{self, Error, Result},
    message::{build_stage_message, StageRequest},
    model::{
        webhook::{EventData, Signature, WebhookPayload},
        Campaign, EmailParams,
    },
    stage::next_stage,
    validate::validate_options,
};

/// Construction parameters of a [`Scheduler`].
///
/// Only provider credentials and the webhook validation toggle are bound at
/// construction; recipients, templates and delays are passed per call so one
/// scheduler can serve many campaigns.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SchedulerOptions {
    pub api_key: Option<String>,

    pub domain: Option<String>,

    pub host: Option<String>,

    pub protocol: Option<String>,

    pub port: Option<u16>,

    pub endpoint: Option<String>,

    pub webhook_signing_key: Option<String>,

    #[serde(default)]
    pub validate_webhooks: bool,

    pub timeout: Option<Duration>,
}

impl SchedulerOptions {
    fn mailgun_config(&self) -> Result<mailgun::Config> {
        validate_options(self)?;

        let mut config = mailgun::Config::new(
            self.api_key.clone().unwrap_or_default(),
            self.domain.clone().unwrap_or_default(),
        );
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(protocol) = &self.protocol {
            config.protocol.clone_from(protocol);
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        config.port = self.port;
        config.webhook_signing_key.clone_from(&self.webhook_signing_key);
        config.timeout = self.timeout;

        Ok(config)
    }
}

/// Result of handling a delivery webhook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WebhookOutcome {
    /// The next stage was sent.
    Advanced { stage: usize, message: Message },

    /// There is no next stage; the campaign has ended for this recipient.
    Finished { stage: Option<usize> },
}

impl WebhookOutcome {
    #[inline]
    #[must_use]
    pub const fn is_advanced(&self) -> bool { matches!(self, Self::Advanced { .. }) }

    #[inline]
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        match self {
            Self::Advanced { message, .. } => Some(message),
            Self::Finished { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct Scheduler {
    transport: Arc<dyn MailTransport>,
    clock: Arc<dyn Clock>,
    validate_webhooks: bool,
}

impl Scheduler {
    /// Creates a scheduler backed by the Mailgun HTTP API.
    ///
    /// # Errors
    ///
    /// Returns an error if a required option is missing or the HTTP client
    /// cannot be built.
    pub fn new(options: SchedulerOptions) -> Result<Self> {
        let config = options.mailgun_config()?;
        let transport = mailgun::Client::new(config).context(error::BuildTransportSnafu)?;

        Ok(Self::from_parts(Arc::new(transport), options.validate_webhooks))
    }

    /// Creates a scheduler with a caller supplied transport.
    ///
    /// # Errors
    ///
    /// Returns an error if a required option is missing.
    pub fn with_transport(
        options: &SchedulerOptions,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self> {
        validate_options(options)?;
        Ok(Self::from_parts(transport, options.validate_webhooks))
    }

    fn from_parts(transport: Arc<dyn MailTransport>, validate_webhooks: bool) -> Self {
        Self { transport, clock: Arc::new(SystemClock), validate_webhooks }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[inline]
    #[must_use]
    pub const fn validate_webhooks(&self) -> bool { self.validate_webhooks }

    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn MailTransport> { &self.transport }

    /// Sends `stage` of the campaign described by `params`.
    ///
    /// Returns the message exactly as it was handed to the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if `stage` is out of range, the delay is too large or
    /// the transport fails.
    #[tracing::instrument(skip(self, params), fields(to = %params.to))]
    pub async fn send(&self, params: &EmailParams, stage: usize) -> Result<Message> {
        self.send_stage(&StageRequest {
            to: &params.to,
            from: &params.from,
            bcc: params.bcc.as_deref(),
            templates: &params.templates,
            stage,
            delay: params.delay,
            custom_vars: &params.custom_vars,
        })
        .await
    }

    /// Sends the first stage of the campaign.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::send`].
    pub async fn start(&self, params: &EmailParams) -> Result<Message> {
        self.send(params, 0).await
    }

    /// Advances a campaign after the provider reported a delivery.
    ///
    /// The webhook is not de-duplicated here: a redelivered webhook for the
    /// same stage sends the next stage again.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedWebhook`] if the payload or campaign is incomplete
    /// - [`Error::InvalidSignature`] if signature validation is enabled and fails
    /// - any error of [`Scheduler::send`] for the advancement send
    #[tracing::instrument(skip_all)]
    pub async fn handle_webhook(
        &self,
        campaign: &Campaign,
        payload: &WebhookPayload,
    ) -> Result<WebhookOutcome> {
        let signature = payload
            .signature
            .as_ref()
            .ok_or(Error::MalformedWebhook { reason: "signature is missing" })?;
        let event_data = payload
            .event_data
            .as_ref()
            .ok_or(Error::MalformedWebhook { reason: "event-data is missing" })?;
        let delay = campaign_delay(campaign)?;

        self.check_signature(signature).await?;

        self.advance(campaign, event_data, delay).await
    }

    /// Checks the signature of a delivery webhook without advancing anything.
    ///
    /// Passes when signature validation is disabled.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedWebhook`] if the payload carries no signature
    /// - [`Error::InvalidSignature`] if signature validation is enabled and fails
    pub async fn verify_webhook(&self, payload: &WebhookPayload) -> Result<()> {
        let signature = payload
            .signature
            .as_ref()
            .ok_or(Error::MalformedWebhook { reason: "signature is missing" })?;

        self.check_signature(signature).await
    }

    /// Advances a campaign for a webhook already accepted by
    /// [`Scheduler::verify_webhook`].
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedWebhook`] if the payload or campaign is incomplete
    /// - any error of [`Scheduler::send`] for the advancement send
    #[tracing::instrument(skip_all)]
    pub async fn handle_verified_webhook(
        &self,
        campaign: &Campaign,
        payload: &WebhookPayload,
    ) -> Result<WebhookOutcome> {
        let event_data = payload
            .event_data
            .as_ref()
            .ok_or(Error::MalformedWebhook { reason: "event-data is missing" })?;
        let delay = campaign_delay(campaign)?;

        self.advance(campaign, event_data, delay).await
    }

    async fn check_signature(&self, signature: &Signature) -> Result<()> {
        if !self.validate_webhooks {
            return Ok(());
        }

        let valid = match signature.timestamp_secs() {
            Some(timestamp) => {
                self.transport
                    .validate_webhook(timestamp, &signature.token, &signature.signature)
                    .await
            }
            None => false,
        };
        if !valid {
            tracing::warn!(
                timestamp = %signature.timestamp,
                "Rejecting webhook with invalid signature"
            );
            return Err(Error::InvalidSignature);
        }

        Ok(())
    }

    async fn advance(
        &self,
        campaign: &Campaign,
        event_data: &EventData,
        delay: u64,
    ) -> Result<WebhookOutcome> {
        let stage = event_data.stage();
        let Some(next) = stage.and_then(|stage| next_stage(stage, campaign.templates.len())) else {
            tracing::info!(?stage, templates = campaign.templates.len(), "Campaign finished");
            return Ok(WebhookOutcome::Finished { stage });
        };

        let headers = event_data
            .headers()
            .ok_or(Error::MalformedWebhook { reason: "event-data.message.headers is missing" })?;
        let custom_vars = event_data.custom_vars();

        tracing::info!(to = %headers.to, next_stage = next, "Advancing campaign");

        let message = self
            .send_stage(&StageRequest {
                to: &headers.to,
                from: &headers.from,
                bcc: None,
                templates: &campaign.templates,
                stage: next,
                delay: Some(delay),
                custom_vars: &custom_vars,
            })
            .await?;

        Ok(WebhookOutcome::Advanced { stage: next, message })
    }

    /// Removes `address` from future deliveries of the sending domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsubscribeFailure`] unless the provider confirms.
    pub async fn unsubscribe(&self, address: &str) -> Result<bool> {
        self.transport
            .unsubscribe(address)
            .await
            .context(error::UnsubscribeFailureSnafu { address: address.to_string() })
    }

    async fn send_stage(&self, request: &StageRequest<'_>) -> Result<Message> {
        let message = build_stage_message(request, self.clock.now())?;

        let response =
            self.transport.send_message(&message).await.context(error::TransportFailureSnafu)?;

        tracing::info!(
            to = %request.to,
            stage = request.stage,
            message_id = %response.id,
            "Sent drip stage"
        );

        Ok(message)
    }
}

fn campaign_delay(campaign: &Campaign) -> Result<u64> {
    let delay = campaign.delay.ok_or(Error::MalformedWebhook { reason: "delay is missing" })?;
    if campaign.templates.is_empty() {
        return Err(Error::MalformedWebhook { reason: "templates are missing" });
    }
    Ok(delay)
}
