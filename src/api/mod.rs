pub mod health;
pub mod market;
pub mod search;
pub mod signals;

use axum::Router;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::{SignalService, SymbolService};
use crate::types::HistoryRequest;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<SignalService>,
    pub symbols: Arc<SymbolService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, service: Arc<SignalService>, symbols: Arc<SymbolService>) -> Self {
        Self {
            config,
            service,
            symbols,
        }
    }
}

/// Date window shared by the history and signal endpoints.
///
/// Missing dates default to the longest allowed window ending today.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time_frame: Option<String>,
}

impl WindowQuery {
    pub fn to_request(&self, code: &str, config: &Config) -> Result<HistoryRequest> {
        let end = match &self.end_date {
            Some(end) => end.clone(),
            None => Utc::now().date_naive().to_string(),
        };
        let start = match &self.start_date {
            Some(start) => start.clone(),
            None => {
                let end_day = chrono::NaiveDate::parse_from_str(&end, "%Y-%m-%d")
                    .unwrap_or_else(|_| Utc::now().date_naive());
                (end_day - Duration::days(config.max_date_range_days)).to_string()
            }
        };
        HistoryRequest::parse(
            code,
            &start,
            &end,
            self.time_frame.as_deref(),
            config.max_date_range_days,
        )
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(search::router())
        .nest("/api/historical", market::router())
        .nest("/api/signals", signals::router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeFrame;

    #[test]
    fn test_window_defaults_to_max_range() {
        let config = Config::default();
        let query = WindowQuery {
            end_date: Some("2024-06-06".to_string()),
            ..WindowQuery::default()
        };
        let req = query.to_request("29049", &config).unwrap();
        assert_eq!(req.end_date.to_string(), "2024-06-06");
        assert_eq!((req.end_date - req.start_date).num_days(), config.max_date_range_days);
        assert_eq!(req.time_frame, TimeFrame::Daily);
    }

    #[test]
    fn test_window_explicit_dates_validated() {
        let query = WindowQuery {
            start_date: Some("2024-06-06".to_string()),
            end_date: Some("2024-01-01".to_string()),
            time_frame: None,
        };
        assert!(query.to_request("29049", &Config::default()).is_err());
    }

    #[test]
    fn test_window_bad_end_date_still_rejected() {
        let query = WindowQuery {
            end_date: Some("June 6".to_string()),
            ..WindowQuery::default()
        };
        assert!(query.to_request("29049", &Config::default()).is_err());
    }
}
