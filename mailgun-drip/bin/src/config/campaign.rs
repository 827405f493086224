use mailgun_drip_core::{Campaign, Template, MAX_DELIVERY_DELAY_SECS};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::error::{self, Error};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CampaignConfig {
    #[serde(default)]
    pub from: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,

    // Seconds between two stages, either a number or a numeric string
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub delay: Option<u64>,

    // Whether the first stage waits `delay` as well
    #[serde(default = "CampaignConfig::default_initial_delay")]
    pub initial_delay: bool,

    #[serde(default)]
    pub templates: Vec<Template>,
}

impl CampaignConfig {
    #[inline]
    pub const fn default_initial_delay() -> bool { true }

    pub fn example() -> Self {
        Self {
            from: "Example <hello@mg.example.com>".to_string(),
            bcc: None,
            delay: Some(24 * 60 * 60),
            initial_delay: false,
            templates: vec![
                Template::text("Welcome aboard", "Thanks for signing up."),
                Template::html("Getting started", "<p>Here is how to get started.</p>"),
            ],
        }
    }
}

impl TryFrom<CampaignConfig> for mailgun_drip_core::config::CampaignConfig {
    type Error = Error;

    fn try_from(
        CampaignConfig { from, bcc, delay, initial_delay, templates }: CampaignConfig,
    ) -> Result<Self, Self::Error> {
        snafu::ensure!(!from.is_empty(), error::MissingSenderSnafu);
        snafu::ensure!(!templates.is_empty(), error::EmptyCampaignSnafu);
        let Some(delay) = delay else { return error::MissingDelaySnafu.fail() };
        snafu::ensure!(
            delay < MAX_DELIVERY_DELAY_SECS,
            error::DelayBeyondHorizonSnafu { delay, max: MAX_DELIVERY_DELAY_SECS }
        );

        Ok(Self { from, bcc, campaign: Campaign { templates, delay: Some(delay) }, initial_delay })
    }
}
