pub mod clock;
pub mod config;
pub mod delay;
pub mod error;
pub mod message;
pub mod model;
pub mod scheduler;
pub mod stage;
pub mod validate;

use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub use self::{
    clock::{Clock, FixedClock, SystemClock},
    delay::{compute_delivery_time, parse_delay, MAX_DELIVERY_DELAY_SECS},
    error::{Error, Result},
    model::{
        webhook::{EventData, EventMessage, MessageHeaders, Signature, WebhookPayload},
        Campaign, CustomVars, EmailParams, Template,
    },
    scheduler::{Scheduler, SchedulerOptions, WebhookOutcome},
    stage::next_stage,
};

pub const PROJECT_NAME: &str = "mailgun-drip";

pub const PROGRAM_NAME: &str = "mailgun-drip";
pub const CONFIG_NAME: &str = "mailgun-drip.yaml";

pub const DEFAULT_WEB_PORT: u16 = 14480;
pub const DEFAULT_WEB_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Key of the stage marker inside the provider's user variables.
pub const STAGE_KEY: &str = "stage";

/// Prefix the provider uses for custom variables on outbound messages.
pub const VARIABLE_PREFIX: &str = "v:";

/// Provider field carrying the scheduled delivery time.
pub const DELIVERY_TIME_FIELD: &str = "o:deliverytime";

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .expect("Creating `ProjectDirs` should always success")
        .config_dir()
        .to_path_buf()
});

#[must_use]
pub fn fallback_project_config_directories() -> Vec<PathBuf> {
    let Some(user_dirs) = directories::UserDirs::new() else {
        return Vec::new();
    };
    vec![
        [user_dirs.home_dir(), (Path::new(".config")), (Path::new(PROJECT_NAME))].iter().collect(),
        [user_dirs.home_dir(), (Path::new(&format!(".{PROJECT_NAME}")))].iter().collect(),
        [&Path::new("/"), &Path::new("etc"), &Path::new(PROJECT_NAME)].iter().collect(),
    ]
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub branch: String,
    pub commit_hash: String,
    pub mailgun_domain: String,
    pub validate_webhooks: bool,
    pub start_time: DateTime<Utc>,
}
