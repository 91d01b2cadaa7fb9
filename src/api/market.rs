use crate::api::WindowQuery;
use crate::error::Result;
use crate::types::{ApiResponse, RawPriceRecord, SeriesRange};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

/// Normalized daily history for one code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalData {
    pub code: String,
    pub time_frame: String,
    pub range: SeriesRange,
    pub count: usize,
    pub records: Vec<RawPriceRecord>,
}

/// GET /api/historical/:code
async fn get_historical(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<HistoricalData>>> {
    let request = query.to_request(&code, &state.config)?;
    let series = state.service.history(&request).await?;

    let data = HistoricalData {
        code: request.code.clone(),
        time_frame: request.time_frame.to_string(),
        range: series.range(),
        count: series.len(),
        records: series.to_raw(),
    };

    Ok(Json(ApiResponse::new(
        data,
        format!("Historical data retrieved for code {}", request.code),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:code", get(get_historical))
}
