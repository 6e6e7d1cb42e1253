use std::fmt::Display;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::types::{INTERNAL_ERROR, UNAUTHORIZED};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", UNAUTHORIZED)]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{}", INTERNAL_ERROR)]
    Internal,
}

impl ApiError {
    /// Logs `cause` and hides it from the client.
    pub fn internal(context: &str, cause: impl Display) -> Self {
        error!(error = %cause, "{context}");
        ApiError::Internal
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, ApiError::Unauthorized) {
            builder.insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"admin\""));
        }

        builder.json(ErrorBody::new(self.to_string()))
    }
}
