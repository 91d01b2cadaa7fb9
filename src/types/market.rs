use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::SignalReport;

/// Bar size requested from the price provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeFrame {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimeFrame {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "d" | "1d" => Some(Self::Daily),
            "weekly" | "w" | "1w" => Some(Self::Weekly),
            "monthly" | "m" | "1m" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Name the upstream API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request for one instrument's price history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_frame: TimeFrame,
}

impl HistoryRequest {
    /// Validate user supplied parameters.
    ///
    /// Dates must be `YYYY-MM-DD`, end may not precede start and the range may
    /// not exceed `max_range_days`.
    pub fn parse(
        code: &str,
        start_date: &str,
        end_date: &str,
        time_frame: Option<&str>,
        max_range_days: i64,
    ) -> Result<Self, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::BadRequest("Stock code must not be empty".to_string()));
        }

        let start = parse_day(start_date)?;
        let end = parse_day(end_date)?;
        if end < start {
            return Err(AppError::BadRequest(
                "End date must be after start date".to_string(),
            ));
        }
        if (end - start).num_days() > max_range_days {
            return Err(AppError::BadRequest(format!(
                "Date range cannot exceed {} days",
                max_range_days
            )));
        }

        let time_frame = match time_frame {
            None => TimeFrame::default(),
            Some(tf) => TimeFrame::from_str(tf).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown time frame: {}", tf))
            })?,
        };

        Ok(Self {
            code: code.to_string(),
            start_date: start,
            end_date: end,
            time_frame,
        })
    }

    /// Same window and bar size for another instrument.
    pub fn for_code(&self, code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..self.clone()
        }
    }

    /// Key for the report cache.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.code, self.start_date, self.end_date, self.time_frame
        )
    }
}

fn parse_day(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date must be in YYYY-MM-DD format".to_string()))
}

/// Standard success envelope for API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Counts for a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BulkSummary {
    pub total_requested: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Per-instrument outcome of a bulk scoring request.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSignals {
    pub successful: BTreeMap<String, SignalReport>,
    pub errors: BTreeMap<String, String>,
    pub summary: BulkSummary,
}

/// An exchange listing returned by symbol search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Numeric upstream code used by the history endpoint.
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub flag: String,
    pub exchange: String,
}

/// Listings matching a search query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchResults {
    pub query: String,
    pub total_results: usize,
    pub stocks: Vec<StockInfo>,
}

/// Primary code for a ticker plus every listing that matched it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StockLookup {
    pub primary_code: String,
    pub symbol: String,
    pub stock_info: StockInfo,
    pub all_matches: Vec<StockInfo>,
}
