use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body shared by every JSON endpoint.
///
/// Successful responses carry `data`, failed ones carry `error`; `_status`
/// repeats the HTTP status code for clients that only see the body.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponse<T, E = Error> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<E>,
}

impl<T, E> EncapsulatedResponse<T, E> {
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn ok(data: T) -> Self { Self { status_code: StatusCode::OK, data: Some(data), error: None } }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn err(error: E) -> Self {
        Self { status_code: StatusCode::INTERNAL_SERVER_ERROR, data: None, error: Some(error) }
    }

    #[inline]
    #[must_use]
    pub const fn status(&self) -> StatusCode { self.status_code }

    #[inline]
    #[must_use]
    pub const fn data_ref(&self) -> Option<&T> { self.data.as_ref() }

    #[inline]
    #[must_use]
    pub const fn error_ref(&self) -> Option<&E> { self.error.as_ref() }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn data(self) -> Option<T> { self.data }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn error(self) -> Option<E> { self.error }
}

/// [`EncapsulatedResponse`] rendered as an `application/json` response.
#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJson<T, E = Error>(pub EncapsulatedResponse<T, E>);

impl<T, E> EncapsulatedJson<T, E> {
    #[inline]
    #[must_use]
    pub fn ok(data: T) -> Self { Self(EncapsulatedResponse::ok(data)) }

    #[inline]
    #[must_use]
    pub fn err(error: E) -> Self { Self(EncapsulatedResponse::err(error)) }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn into_inner(self) -> EncapsulatedResponse<T, E> { self.0 }
}

impl<T> From<(StatusCode, T)> for EncapsulatedJson<T> {
    #[inline]
    fn from((status_code, data): (StatusCode, T)) -> Self { Self::ok(data).status_code(status_code) }
}

impl<T, E> IntoResponse for EncapsulatedJson<T, E>
where
    T: Serialize,
    E: Serialize,
{
    fn into_response(self) -> Response {
        let status_code = self.0.status_code;
        let body = match serde_json::to_vec(&self.0) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!("Failed to serialize response body, error: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        (status_code, [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())], Body::from(body))
            .into_response()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Error {
    #[serde(rename = "type")]
    pub type_: ErrorType,

    pub message: String,

    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty")]
    pub additional_fields: IndexMap<String, serde_json::Value>,
}

impl Error {
    #[must_use]
    pub fn new(type_: ErrorType, message: impl Into<String>) -> Self {
        Self { type_, message: message.into(), additional_fields: IndexMap::new() }
    }

    #[must_use]
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        drop(self.additional_fields.insert(key.into(), value.into()));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Internal,
    BadRequest,
    NotFound,
    NotAcceptable,
    UpstreamFailure,
}

#[macro_export]
macro_rules! json_response {
    (status: $status:expr,data: $data:expr) => {
        $crate::__private::IntoResponse::into_response(
            $crate::response::EncapsulatedJson::<_, $crate::response::Error>::ok($data)
                .status_code($status),
        )
    };

    (status: $status:expr,error: $error:expr) => {
        $crate::__private::IntoResponse::into_response(
            $crate::response::EncapsulatedJson::<(), _>::err($error).status_code($status),
        )
    };

    (reason: $reason:expr,status: $status:expr,error: $error:expr) => {{
        let status: $crate::__private::StatusCode = $status;
        if status.is_server_error() {
            $crate::__private::tracing::error!(
                status_code = status.as_u16(),
                "Internal Server Error: {}",
                $reason
            );
        } else {
            $crate::__private::tracing::warn!(
                status_code = status.as_u16(),
                "Response Error: {}",
                $reason
            );
        }

        $crate::json_response! { status: status, error: $error }
    }};
}
