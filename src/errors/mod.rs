use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::db::{GatewayError, RunError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Store unreachable or timed out.
    #[error("{message}: {detail}")]
    Connection { message: &'static str, detail: String },
    /// A read failed after connecting.
    #[error("{message}: {detail}")]
    Query { message: &'static str, detail: String },
    #[error("Wrong content-type. Only application/json is supported")]
    UnsupportedMediaType,
    /// Malformed payload or a statement the store rejected.
    #[error("{message}")]
    BadRequest {
        message: &'static str,
        detail: Option<String>,
    },
    #[error("{0}")]
    NotFound(&'static str),
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub detailed_message: Option<String>,
}

impl ApiError {
    pub fn input(detail: impl ToString) -> Self {
        ApiError::BadRequest {
            message: "Input Error",
            detail: Some(detail.to_string()),
        }
    }

    /// Maps a failed read: connecting is a 500 with its own message,
    /// anything after that is a 500 with `message`.
    pub fn from_read(err: RunError, message: &'static str) -> Self {
        match err {
            RunError::Connect(err) => ApiError::connection(err),
            RunError::Execute(err @ GatewayError::Timeout(_)) => ApiError::connection(err),
            RunError::Execute(err) => ApiError::Query {
                message,
                detail: err.to_string(),
            },
        }
    }

    /// Maps a failed insert/update/delete: store rejections are the caller's
    /// problem (400), unique violations get their own message.
    pub fn from_write(err: RunError) -> Self {
        match err {
            RunError::Connect(err) => ApiError::connection(err),
            RunError::Execute(err @ GatewayError::Timeout(_)) => ApiError::connection(err),
            RunError::Execute(err) if err.is_unique_violation() => ApiError::BadRequest {
                message: "Employee already exists",
                detail: Some(err.to_string()),
            },
            RunError::Execute(err) => ApiError::input(err),
        }
    }

    fn connection(err: GatewayError) -> Self {
        ApiError::Connection {
            message: "Error connecting to DB",
            detail: err.to_string(),
        }
    }

    fn body(&self) -> ErrorResponse {
        let (message, detail) = match self {
            ApiError::Connection { message, detail } | ApiError::Query { message, detail } => {
                (message.to_string(), Some(detail.clone()))
            }
            ApiError::UnsupportedMediaType => (self.to_string(), None),
            ApiError::BadRequest { message, detail } => (message.to_string(), detail.clone()),
            ApiError::NotFound(message) => (message.to_string(), None),
        };
        ErrorResponse {
            status: self.status_code().as_u16(),
            message,
            detailed_message: detail,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Connection { .. } | ApiError::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
