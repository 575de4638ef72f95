use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("failed to parse request: {0}")]
    RequestParsingError(#[from] serde_json::Error),
    // The caller gets the delivery failure's own message, nothing wrapped
    // around it.
    #[error("{0}")]
    ForwardError(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::RequestParsingError(_) | RelayError::ForwardError(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
        }
        .into_response()
    }
}
