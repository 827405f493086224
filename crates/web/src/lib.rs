pub mod response;

#[doc(hidden)]
pub mod __private {
    pub use axum::{http::StatusCode, response::IntoResponse};
    pub use tracing;
}
