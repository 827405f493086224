mod campaign;
mod error;
mod mailgun;
mod web;
mod webhook_dedup;

use std::path::{Path, PathBuf};

use drip_cli_common::config::LogConfig;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::{
    campaign::CampaignConfig, error::Error, mailgun::MailgunConfig, web::WebConfig,
    webhook_dedup::WebhookDedupConfig,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub mailgun: MailgunConfig,

    pub campaign: CampaignConfig,

    #[serde(default)]
    pub webhook_dedup: WebhookDedupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            web: WebConfig::default(),
            mailgun: MailgunConfig::default(),
            campaign: CampaignConfig::example(),
            webhook_dedup: WebhookDedupConfig::default(),
        }
    }
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [
            mailgun_drip_core::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(mailgun_drip_core::CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    /// The first existing configuration file among the default path and the
    /// fallback directories, or the default path when none exists.
    pub fn search_path() -> PathBuf {
        std::iter::once(Self::default_path())
            .chain(
                mailgun_drip_core::fallback_project_config_directories()
                    .into_iter()
                    .map(|dir| dir.join(mailgun_drip_core::CONFIG_NAME)),
            )
            .find(|path| path.is_file())
            .unwrap_or_else(Self::default_path)
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(&path)
            .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

        Self::from_yaml(&data, path.as_ref())
    }

    fn from_yaml(data: &str, filename: &Path) -> Result<Self, Error> {
        let mut config: Self = serde_yaml::from_str(data)
            .context(error::ParseConfigSnafu { filename: filename.to_path_buf() })?;

        config.log.file_path = config
            .log
            .file_path
            .map(|path| {
                path.try_resolve()
                    .map(|resolved| resolved.to_path_buf())
                    .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
            })
            .transpose()?;

        Ok(config)
    }
}

#[inline]
pub fn load_server_config(
    Config { web, mailgun, campaign, webhook_dedup, .. }: Config,
) -> Result<mailgun_drip_core::config::Config, Error> {
    Ok(mailgun_drip_core::config::Config {
        web: web.into(),
        scheduler: mailgun.into(),
        campaign: campaign.try_into()?,
        webhook_dedup: webhook_dedup.into(),
    })
}
