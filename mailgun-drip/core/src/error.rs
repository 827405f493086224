use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{field} must be defined"))]
    MissingRequiredField { field: &'static str },

    #[snafu(display(
        "Delay of {delay}s is too big, Mailgun only schedules messages up to {max}s (3 days) in \
         the future"
    ))]
    DelayTooLarge { delay: u64, max: u64 },

    #[snafu(display("Invalid delay `{value}`, expected a non-negative number of seconds"))]
    InvalidDelay { value: String },

    #[snafu(display("Webhook not validated; invalid signature"))]
    InvalidSignature,

    #[snafu(display("Malformed webhook: {reason}"))]
    MalformedWebhook { reason: &'static str },

    #[snafu(display("Stage {stage} is out of range for a campaign of {count} templates"))]
    StageOutOfRange { stage: usize, count: usize },

    #[snafu(display("Mailgun errored while trying to send: {source}"))]
    TransportFailure { source: mail_transport::Error },

    #[snafu(display("Mailgun errored while trying to unsubscribe {address}: {source}"))]
    UnsubscribeFailure { address: String, source: mail_transport::Error },

    #[snafu(display("Could not build Mailgun client, error: {source}"))]
    BuildTransport { source: mail_transport::Error },
}
