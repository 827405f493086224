use std::{io, io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use snafu::ResultExt;

use crate::{
    command::{run_server, start_campaign, unsubscribe, StartOptions},
    config::Config,
    error, shadow,
};

#[derive(Debug, Parser)]
#[command(author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about,
    long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(
        long = "config",
        short = 'c',
        env = "MAILGUN_DRIP_CONFIG_FILE_PATH",
        help = "Specify a configuration file"
    )]
    config_file_path: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(about = "Print version information")]
    Version,

    #[clap(about = "Output shell completion code for the specified shell (bash, zsh, fish)")]
    Completion { shell: Shell },

    #[clap(about = "Output default configuration")]
    DefaultConfig,

    #[clap(about = "Run the webhook receiver")]
    #[command(visible_alias = "run")]
    Server,

    #[clap(about = "Start the configured campaign for a recipient")]
    Start(StartOptions),

    #[clap(about = "Unsubscribe an address from the sending domain")]
    Unsubscribe {
        #[arg(help = "Address to unsubscribe")]
        address: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<(), Box<error::Error>> {
        match self.command {
            Command::Version => {
                write_stdout(Self::command().render_long_version().as_bytes())?;
            }
            Command::Completion { shell } => {
                let mut command = Self::command();
                let bin_name = command.get_name().to_string();
                clap_complete::generate(shell, &mut command, bin_name, &mut io::stdout());
            }
            Command::DefaultConfig => {
                let config_text =
                    serde_yaml::to_string(&Config::default()).expect("`Config` is serializable");
                write_stdout(config_text.as_bytes())?;
            }
            Command::Server => {
                let config = self.load_config()?;
                run_server(config)?;
            }
            Command::Start(ref options) => {
                let config = self.load_config()?;
                start_campaign(config, options)?;
            }
            Command::Unsubscribe { ref address } => {
                let config = self.load_config()?;
                unsubscribe(config, address)?;
            }
        }

        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn load_config(&self) -> Result<Config, error::Error> {
        let config_file_path = self.config_file_path.clone().unwrap_or_else(Config::search_path);
        Ok(Config::load(config_file_path)?)
    }
}

#[allow(clippy::result_large_err)]
pub fn write_stdout(bytes: &[u8]) -> Result<(), error::Error> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes).and_then(|()| stdout.flush()).context(error::WriteStdoutSnafu)
}
