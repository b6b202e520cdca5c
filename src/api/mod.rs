//! REST API module.
//!
//! JSON endpoints over the same store and form validation the dashboard uses.

mod attendance;
mod members;

pub use attendance::*;
pub use members::*;

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::forms::parse_date;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `?date=YYYY-MM-DD`, defaulting to today (UTC).
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    pub fn resolve(&self) -> Result<NaiveDate, AppError> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => parse_date(raw, "date").map_err(|e| AppError::BadRequest(e.message())),
            None => Ok(today()),
        }
    }
}

/// `?confirm=true`, required by every delete.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

impl DeleteQuery {
    pub fn require(&self) -> Result<(), AppError> {
        if self.confirm {
            Ok(())
        } else {
            Err(AppError::BadRequest(
                "Delete must be confirmed with ?confirm=true".to_string(),
            ))
        }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
