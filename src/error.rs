use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Raw price input that cannot become a canonical series.
///
/// Not retryable by the engine: the caller has to fetch a corrected series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidSeriesError {
    #[error("series has {count} usable points, at least 2 are required")]
    TooFewPoints { count: usize },

    #[error("record dated {date} violates OHLC ordering")]
    OhlcViolation { date: NaiveDate },

    #[error("unparseable date: {value:?}")]
    UnparseableDate { value: String },

    #[error("dropped {dropped} of {total} records with invalid numeric fields")]
    ExcessiveDropRate { dropped: usize, total: usize },
}

/// A valid series that is too short for one indicator's window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{indicator} requires at least {required} points, got {available}")]
pub struct InsufficientDataError {
    pub indicator: &'static str,
    pub required: usize,
    pub available: usize,
}

/// An indicator whose value is mathematically undefined for this input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticDegenerateError {
    #[error("volume baseline over {period} periods is zero")]
    ZeroVolumeBaseline { period: usize },

    #[error("{indicator} period must be positive")]
    ZeroPeriod { indicator: &'static str },
}

/// Every failure the scoring engine can return.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("invalid series: {0}")]
    InvalidSeries(#[from] InvalidSeriesError),

    #[error("insufficient data: {0}")]
    InsufficientData(#[from] InsufficientDataError),

    #[error("degenerate indicator: {0}")]
    ArithmeticDegenerate(#[from] ArithmeticDegenerateError),
}

pub type SignalResult<T> = std::result::Result<T, SignalError>;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Signal(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::ExternalApi(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
