use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not open config from {}, error: {source}", filename.display()))]
    OpenConfig { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Count not parse config from {}, error: {source}", filename.display()))]
    ParseConfig { filename: PathBuf, source: serde_yaml::Error },

    #[snafu(display("Could not resolve file path {}, error: {source}", file_path.display()))]
    ResolveFilePath { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Campaign sender `campaign.from` is not configured"))]
    MissingSender,

    #[snafu(display("Campaign has no templates, configure at least one in `campaign.templates`"))]
    EmptyCampaign,

    #[snafu(display("Campaign delay is not configured, webhooks can not advance the campaign"))]
    MissingDelay,

    #[snafu(display(
        "Campaign delay {delay}s reaches the scheduling horizon of {max}s, use a shorter \
         `campaign.delay`"
    ))]
    DelayBeyondHorizon { delay: u64, max: u64 },
}
