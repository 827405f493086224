use std::{net::SocketAddr, time::Duration};

use crate::{
    model::{Campaign, CustomVars, EmailParams},
    scheduler::SchedulerOptions,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub web: WebConfig,

    pub scheduler: SchedulerOptions,

    pub campaign: CampaignConfig,

    pub webhook_dedup: WebhookDedupConfig,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub listen_address: SocketAddr,
}

/// The campaign served by the webhook receiver.
#[derive(Clone, Debug)]
pub struct CampaignConfig {
    pub from: String,

    pub bcc: Option<String>,

    pub campaign: Campaign,

    /// Whether the first stage is scheduled with the campaign delay too.
    pub initial_delay: bool,
}

impl CampaignConfig {
    /// Parameters for starting this campaign for `to`.
    #[must_use]
    pub fn email_params(
        &self,
        to: String,
        bcc: Option<String>,
        custom_vars: CustomVars,
    ) -> EmailParams {
        EmailParams {
            to,
            from: self.from.clone(),
            bcc: bcc.or_else(|| self.bcc.clone()),
            templates: self.campaign.templates.clone(),
            delay: if self.initial_delay { self.campaign.delay } else { None },
            custom_vars,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WebhookDedupConfig {
    pub enable: bool,

    pub ttl: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Template;

    fn campaign_config(initial_delay: bool) -> CampaignConfig {
        CampaignConfig {
            from: "fromemail@domain.com".to_string(),
            bcc: Some("audit@domain.com".to_string()),
            campaign: Campaign {
                templates: vec![Template::text("Test 0", "Sending text email 0")],
                delay: Some(60),
            },
            initial_delay,
        }
    }

    #[test]
    fn test_email_params_honours_initial_delay() {
        let params = campaign_config(true).email_params(
            "toemail@domain.com".to_string(),
            None,
            CustomVars::new(),
        );
        assert_eq!(params.delay, Some(60));
        assert_eq!(params.bcc.as_deref(), Some("audit@domain.com"));

        let params = campaign_config(false).email_params(
            "toemail@domain.com".to_string(),
            Some("other@domain.com".to_string()),
            CustomVars::new(),
        );
        assert_eq!(params.delay, None);
        assert_eq!(params.bcc.as_deref(), Some("other@domain.com"));
        assert_eq!(params.from, "fromemail@domain.com");
    }
}
