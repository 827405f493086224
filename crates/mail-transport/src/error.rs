use snafu::Snafu;

/// Errors that can occur in the mail transport crate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Failed to build the underlying HTTP client.
    #[snafu(display("Failed to build HTTP client, error: {source}"))]
    BuildHttpClient {
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// HTTP request failed.
    #[snafu(display("HTTP request failed: {source}"))]
    HttpRequest {
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// The provider rejected the message.
    #[snafu(display("Provider rejected message with status {status}: {message}"))]
    SendMessage {
        /// HTTP status returned by the provider, `0` when no response was received.
        status: u16,
        /// Response body or failure description.
        message: String,
    },

    /// The provider rejected the unsubscribe call.
    #[snafu(display("Failed to unsubscribe {address}, status {status}: {message}"))]
    Unsubscribe {
        /// Address that was being unsubscribed.
        address: String,
        /// HTTP status returned by the provider.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The provider response could not be decoded.
    #[snafu(display("Failed to decode provider response: {source}"))]
    DecodeResponse {
        /// The underlying reqwest error.
        source: reqwest::Error,
    },
}
