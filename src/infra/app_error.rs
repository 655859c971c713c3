use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{pricing::PricingError, validation::FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests, please try again later.")]
    TooManyRequests { retry_after: Duration },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// `{"error": "..."}`
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"errors": [{"field": "...", "message": "..."}]}`
#[derive(Serialize, Debug, ToSchema)]
pub struct ValidationErrorBody {
    pub errors: Vec<FieldError>,
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        match self {
            AppError::Validation(errors) => {
                (status, Json(ValidationErrorBody { errors })).into_response()
            }
            AppError::TooManyRequests { retry_after } => {
                let mut response = (status, Json(ErrorBody { error: message })).into_response();
                let secs = (retry_after.as_secs_f64().ceil() as u64).max(1);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            AppError::Other(err) => {
                tracing::error!("{:#}", err);
                (
                    status,
                    Json(ErrorBody {
                        error: "Server error".into(),
                    }),
                )
                    .into_response()
            }
            AppError::BadRequest(_) | AppError::NotFound(_) => {
                (status, Json(ErrorBody { error: message })).into_response()
            }
        }
    }
}
