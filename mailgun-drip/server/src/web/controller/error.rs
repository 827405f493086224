use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drip_axum::{
    json_response,
    response::{self, ErrorType},
};
use mailgun_drip_core::Error as SchedulerError;
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Scheduler { source: SchedulerError },
}

impl From<SchedulerError> for Error {
    fn from(source: SchedulerError) -> Self { Self::Scheduler { source } }
}

impl Error {
    const fn status(&self) -> (StatusCode, ErrorType) {
        let Self::Scheduler { source } = self;
        match source {
            // Mailgun stops retrying a webhook answered with 406
            SchedulerError::InvalidSignature => (StatusCode::NOT_ACCEPTABLE, ErrorType::NotAcceptable),
            SchedulerError::MalformedWebhook { .. }
            | SchedulerError::DelayTooLarge { .. }
            | SchedulerError::InvalidDelay { .. }
            | SchedulerError::StageOutOfRange { .. } => {
                (StatusCode::BAD_REQUEST, ErrorType::BadRequest)
            }
            SchedulerError::TransportFailure { .. } | SchedulerError::UnsubscribeFailure { .. } => {
                (StatusCode::BAD_GATEWAY, ErrorType::UpstreamFailure)
            }
            SchedulerError::MissingRequiredField { .. } | SchedulerError::BuildTransport { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorType::Internal)
            }
        }
    }
}

impl IntoResponse for Error {
    // SAFETY: allow: high cognitive complexity caused by `tracing` macro
    #[allow(clippy::cognitive_complexity)]
    fn into_response(self) -> Response {
        let (status, type_) = self.status();
        json_response! {
            reason: self,
            status: status,
            error: response::Error::new(type_, self.to_string())
        }
    }
}
