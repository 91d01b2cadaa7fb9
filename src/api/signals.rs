//! Signal API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::WindowQuery;
use crate::error::{AppError, Result};
use crate::types::{ApiResponse, BulkSignals, SignalReport};
use crate::AppState;

/// Query parameters for the bulk endpoint.
#[derive(Debug, Deserialize)]
pub struct BulkQuery {
    /// Comma separated instrument codes.
    pub codes: Option<String>,
    #[serde(flatten)]
    pub window: WindowQuery,
}

/// Create the signals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bulk", get(get_bulk_signals))
        .route("/:code", get(get_signal))
}

/// Confluence report for one code.
async fn get_signal(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<SignalReport>>> {
    let request = query.to_request(&code, &state.config)?;
    let report = state.service.signal(&request).await?;
    let message = format!(
        "Signal for {}: {} ({}/5)",
        request.code,
        report.result.tier.label(),
        report.result.score
    );
    Ok(Json(ApiResponse::new(report, message)))
}

/// Reports for several codes over one window.
async fn get_bulk_signals(
    State(state): State<AppState>,
    Query(query): Query<BulkQuery>,
) -> Result<Json<ApiResponse<BulkSignals>>> {
    let codes: Vec<String> = query
        .codes
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Query parameter 'codes' is required".to_string()))?
        .split(',')
        .map(str::to_string)
        .collect();

    // Validate the window once against a placeholder code
    let template = query.window.to_request("bulk", &state.config)?;
    let bulk = state.service.bulk_signals(&codes, &template).await?;

    let message = format!(
        "Bulk signal request completed: {}/{} successful",
        bulk.summary.successful, bulk.summary.total_requested
    );
    Ok(Json(ApiResponse::new(bulk, message)))
}
