use std::{
    fmt::{self, Display, Formatter},
    fs::OpenOptions,
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use snafu::{ResultExt, Snafu};
use tracing_subscriber::{
    filter::EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, Layer,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid log filter directives `{filters}`, error: {source}"))]
    ParseFilter { filters: String, source: tracing_subscriber::filter::ParseError },

    #[snafu(display("Could not open log file {}, error: {source}", file_path.display()))]
    OpenLogFile { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Could not connect to journald, error: {source}"))]
    ConnectJournald { source: std::io::Error },

    #[snafu(display("A global logger has already been installed, error: {source}"))]
    InstallSubscriber { source: tracing_subscriber::util::TryInitError },
}

// SAFETY: each sink is toggled separately in the configuration file.
#[allow(clippy::struct_excessive_bools)]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_file_path")]
    pub file_path: Option<PathBuf>,

    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    #[serde(default = "LogConfig::default_emit_stdout")]
    pub emit_stdout: bool,

    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    #[serde(default = "LogConfig::default_log_filters")]
    pub log_filters: String,

    #[serde(default = "LogConfig::default_log_formatter")]
    #[serde_as(as = "DisplayFromStr")]
    pub formatter: LogFormatter,

    // Emit a `close` event with busy and idle time for every instrumented span
    #[serde(default = "LogConfig::default_show_fn_latency")]
    pub show_fn_latency: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: Self::default_file_path(),
            emit_journald: Self::default_emit_journald(),
            emit_stdout: Self::default_emit_stdout(),
            emit_stderr: Self::default_emit_stderr(),
            log_filters: Self::default_log_filters(),
            formatter: Self::default_log_formatter(),
            show_fn_latency: Self::default_show_fn_latency(),
        }
    }
}

impl LogConfig {
    #[inline]
    #[must_use]
    pub fn default_log_filters() -> String {
        "info,mailgun_drip=info,mail_transport=info,tower_http=info".to_string()
    }

    #[inline]
    #[must_use]
    pub const fn default_file_path() -> Option<PathBuf> { None }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stdout() -> bool { true }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_log_formatter() -> LogFormatter { LogFormatter::Pretty }

    #[inline]
    #[must_use]
    pub const fn default_show_fn_latency() -> bool { false }

    /// Logs go to stderr only, keeping stdout free for command output.
    #[must_use]
    pub fn for_command_output(mut self) -> Self {
        if self.emit_stdout {
            self.emit_stdout = false;
            self.emit_stderr = true;
        }
        self
    }

    fn sinks(&self) -> Vec<LogSink> {
        let mut sinks = Vec::with_capacity(4);
        if self.emit_journald {
            sinks.push(LogSink::Journald);
        }
        if let Some(path) = &self.file_path {
            sinks.push(LogSink::File(path.clone()));
        }
        if self.emit_stdout {
            sinks.push(LogSink::Stdout);
        }
        if self.emit_stderr {
            sinks.push(LogSink::Stderr);
        }
        sinks
    }

    /// Installs the global `tracing` subscriber.
    ///
    /// # Errors
    ///
    /// Fails on invalid filter directives, an unwritable log file, an
    /// unreachable journald socket or when a subscriber is already installed.
    pub fn init(&self) -> Result<(), Error> {
        let filter = EnvFilter::try_new(self.log_filters.as_str())
            .context(ParseFilterSnafu { filters: self.log_filters.clone() })?;

        let span_events = if self.show_fn_latency { FmtSpan::CLOSE } else { FmtSpan::NONE };

        let layers = self
            .sinks()
            .into_iter()
            .map(|sink| sink.layer(&self.formatter, span_events.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .try_init()
            .context(InstallSubscriberSnafu)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LogSink {
    Stdout,
    Stderr,
    Journald,
    File(PathBuf),
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

impl LogSink {
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self, formatter: &LogFormatter, span_events: FmtSpan) -> Result<BoxedLayer<S>, Error>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let fmt = tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_target(true)
            .with_span_events(span_events);

        let layer = match (self, formatter) {
            (Self::Journald, _) => tracing_journald::layer().context(ConnectJournaldSnafu)?.boxed(),
            (Self::Stdout, LogFormatter::Pretty) => fmt.with_writer(std::io::stdout).pretty().boxed(),
            (Self::Stdout, LogFormatter::Json) => {
                fmt.with_writer(std::io::stdout).json().flatten_event(true).boxed()
            }
            (Self::Stderr, LogFormatter::Pretty) => fmt.with_writer(std::io::stderr).pretty().boxed(),
            (Self::Stderr, LogFormatter::Json) => {
                fmt.with_writer(std::io::stderr).json().flatten_event(true).boxed()
            }
            (Self::File(file_path), formatter) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path)
                    .context(OpenLogFileSnafu { file_path })?;
                match formatter {
                    LogFormatter::Pretty => fmt.with_writer(file).with_ansi(false).boxed(),
                    LogFormatter::Json => fmt.with_writer(file).json().flatten_event(true).boxed(),
                }
            }
        };

        Ok(layer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogFormatter {
    Pretty,
    Json,
}

impl FromStr for LogFormatter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("json") { Ok(Self::Json) } else { Ok(Self::Pretty) }
    }
}

impl Display for LogFormatter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}
