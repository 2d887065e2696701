use crate::services::ServiceError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared_types::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::MissingUserId
                | ServiceError::UnsupportedFileType(_)
                | ServiceError::NoValidContacts
                | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ServiceError::Interchange(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
                ServiceError::NoContactsFound | ServiceError::ContactNotFound => {
                    StatusCode::NOT_FOUND
                }
                ServiceError::Interchange(_) | ServiceError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            ErrorResponse::with_details("Internal server error", self.to_string())
        } else {
            ErrorResponse::new(self.to_string())
        };

        HttpResponse::build(status).json(body)
    }
}
