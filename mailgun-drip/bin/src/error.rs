use snafu::Snafu;

use crate::config;

/// Result type alias for the CLI.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for the CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Application { source: mailgun_drip_server::Error },

    #[snafu(display("{source}"))]
    Scheduler { source: mailgun_drip_core::Error },

    #[snafu(display("Could not initialize tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: tokio::io::Error },

    #[snafu(display("Could not initialize logger, error: {source}"))]
    InitializeLogger { source: drip_cli_common::config::LogError },

    #[snafu(display("{source}"))]
    Config { source: config::Error },

    #[snafu(display("Could not encode command output, error: {source}"))]
    EncodeOutput { source: serde_json::Error },

    #[snafu(display("Could not write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },
}

impl From<config::Error> for Error {
    fn from(source: config::Error) -> Self { Self::Config { source } }
}

impl From<mailgun_drip_server::Error> for Error {
    fn from(source: mailgun_drip_server::Error) -> Self { Self::Application { source } }
}

impl From<mailgun_drip_core::Error> for Error {
    fn from(source: mailgun_drip_core::Error) -> Self { Self::Scheduler { source } }
}

pub trait CommandError {
    fn exit_code(&self) -> exitcode::ExitCode;
}

impl CommandError for Error {
    fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Scheduler { source: mailgun_drip_core::Error::MissingRequiredField { .. } } => {
                exitcode::CONFIG
            }
            Self::Application { .. } | Self::Scheduler { .. } => exitcode::SOFTWARE,
            Self::Config { .. } | Self::InitializeLogger { .. } => exitcode::CONFIG,
            Self::InitializeTokioRuntime { .. }
            | Self::EncodeOutput { .. }
            | Self::WriteStdout { .. } => exitcode::IOERR,
        }
    }
}
