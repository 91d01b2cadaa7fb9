//! IDX Signal - confluence signal scoring for Indonesian equities

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;
pub mod sources;
pub mod types;

pub use api::AppState;
pub use config::{Config, ScoringConfig};
pub use error::{AppError, InsufficientDataError, InvalidSeriesError, SignalError};
pub use services::signals::{normalize, SignalEngine};
pub use types::*;
