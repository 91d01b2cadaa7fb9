use crate::services::CacheStats;
use crate::types::ApiResponse;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
    environment: &'static str,
    cache: CacheStats,
    search_cache: CacheStats,
}

#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

async fn root() -> Json<ApiResponse<ServiceInfo>> {
    Json(ApiResponse::new(
        ServiceInfo {
            name: "IDX Signal",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: vec![
                "/api/health - Service health",
                "/api/search?q= - Search Indonesian stocks",
                "/api/stock-info?symbol= - Resolve a ticker to its code",
                "/api/historical/:code - Normalized daily price history",
                "/api/signals/:code - Confluence signal report",
                "/api/signals/bulk?codes=a,b - Signal reports for several codes",
            ],
        },
        "IDX Signal API - Ready to score stocks",
    ))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.as_str(),
        cache: state.service.cache_stats(),
        search_cache: state.symbols.cache_stats(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            timestamp: Utc::now(),
            version: "1.0.0",
            environment: "testing",
            cache: CacheStats::default(),
            search_cache: CacheStats::default(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"timestamp\":"));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"cache\":{\"enabled\":false,\"entries\":0,\"hits\":0,\"misses\":0}"));
        assert!(json.contains("\"searchCache\":"));
    }

    #[tokio::test]
    async fn test_root_handler() {
        let Json(response) = root().await;
        assert!(response.success);
        assert_eq!(response.data.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(response.data.endpoints.len(), 6);
    }
}
