use clap::Args;
use mailgun_drip_core::{parse_delay, CustomVars, Scheduler};
use serde::Serialize;
use serde_json::Value;
use snafu::ResultExt;
use tokio::runtime::Runtime;

use crate::{
    cli::write_stdout,
    config::Config,
    error::{self, Result},
};

#[derive(Args, Clone, Debug)]
pub struct StartOptions {
    #[arg(long, help = "Recipient of the campaign")]
    pub to: String,

    #[arg(long, help = "Blind copy recipient, overrides `campaign.bcc`")]
    pub bcc: Option<String>,

    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        value_parser = parse_custom_var,
        help = "Custom variable carried on every stage, may be repeated"
    )]
    pub vars: Vec<(String, String)>,

    #[arg(
        long,
        value_parser = parse_delay_arg,
        help = "Seconds before the first stage is delivered, overrides `campaign.initial_delay`"
    )]
    pub delay: Option<u64>,
}

fn parse_custom_var(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid variable `{value}`, expected KEY=VALUE"))
}

fn parse_delay_arg(value: &str) -> std::result::Result<u64, String> {
    parse_delay(value).map_err(|err| err.to_string())
}

/// Send the first stage of the configured campaign and print the message
#[allow(clippy::result_large_err)]
pub fn start_campaign(config: Config, options: &StartOptions) -> Result<()> {
    let Config { log, mailgun, campaign, .. } = config;

    log.for_command_output().init().context(error::InitializeLoggerSnafu)?;

    let campaign: mailgun_drip_core::config::CampaignConfig = campaign.try_into()?;
    let scheduler = Scheduler::new(mailgun.into())?;

    let custom_vars: CustomVars = options
        .vars
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    let mut params = campaign.email_params(options.to.clone(), options.bcc.clone(), custom_vars);
    if options.delay.is_some() {
        params.delay = options.delay;
    }

    let runtime = Runtime::new().context(error::InitializeTokioRuntimeSnafu)?;
    let message = runtime.block_on(scheduler.start(&params))?;

    print_json(&message)
}

/// Unsubscribe `address` and print the provider's answer
#[allow(clippy::result_large_err)]
pub fn unsubscribe(config: Config, address: &str) -> Result<()> {
    #[derive(Serialize)]
    struct Output<'a> {
        address: &'a str,
        unsubscribed: bool,
    }

    let Config { log, mailgun, .. } = config;

    log.for_command_output().init().context(error::InitializeLoggerSnafu)?;

    let scheduler = Scheduler::new(mailgun.into())?;

    let runtime = Runtime::new().context(error::InitializeTokioRuntimeSnafu)?;
    let unsubscribed = runtime.block_on(scheduler.unsubscribe(address))?;

    print_json(&Output { address, unsubscribed })
}

#[allow(clippy::result_large_err)]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).context(error::EncodeOutputSnafu)?;
    text.push('\n');
    write_stdout(text.as_bytes())
}
