use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use database::model::validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// Client facing failure of a person endpoint. Store details never reach the body, they are
/// logged where the error is raised.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request")]
    InvalidId,

    #[error("bad json request")]
    InvalidBody,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("not found")]
    NotFound,

    #[error("internal server error")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::InvalidBody | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::InvalidId | ApiError::Internal => json!({ "error": self.to_string() }),
            ApiError::InvalidBody | ApiError::Validation(_) => {
                json!({ "errors": self.to_string() })
            }
            ApiError::NotFound => json!({}),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
