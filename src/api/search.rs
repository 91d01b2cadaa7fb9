use crate::error::Result;
use crate::types::{ApiResponse, SearchResults, StockLookup};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    #[serde(default)]
    pub symbol: String,
}

/// GET /api/search?q=
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResults>>> {
    let results = state.symbols.search(&query.q).await?;
    let message = format!(
        "Found {} Indonesian stocks matching '{}'",
        results.total_results, results.query
    );
    Ok(Json(ApiResponse::new(results, message)))
}

/// GET /api/stock-info?symbol=
async fn stock_info(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<ApiResponse<StockLookup>>> {
    let lookup = state.symbols.stock_info(&query.symbol).await?;
    let message = format!("Stock information retrieved for symbol '{}'", lookup.symbol);
    Ok(Json(ApiResponse::new(lookup, message)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/stock-info", get(stock_info))
}
