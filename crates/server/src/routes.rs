//! HTTP API — channel reports, segmentation and health

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use engine::{run_segmentation, ChannelAggregator, ReportKind, SegmentationConfig};
use persistence::Database;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::APP_VERSION;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub channels: Arc<ChannelAggregator>,
    pub segmentation: Arc<SegmentationConfig>,
}

/// Full application: `/api/*` routes with permissive CORS
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/channels", get(api_channels))
        .route("/segments", get(api_segments))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "broker-segments",
        "version": APP_VERSION,
    }))
}

/// GET /api/channels?type={user_count|commission_sum|lifetime}
async fn api_channels(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let kind = ReportKind::from_param(params.get("type").map(|s| s.as_str()));

    match state.channels.report(kind).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!(report = %kind, error = %e, "Channel report failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/segments?as_of=YYYY-MM-DD — recomputed on every call
async fn api_segments(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let as_of = match params.get("as_of") {
        Some(raw) => match raw.parse::<NaiveDate>() {
            Ok(date) => date,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid as_of date '{raw}': {e}"),
                )
            }
        },
        None => Utc::now().date_naive(),
    };

    info!(%as_of, "Segmentation requested via API");

    match run_segmentation(state.db.pool(), as_of, &state.segmentation).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!(%as_of, error = %e, "Segmentation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use persistence::repository::ledger::{account, LedgerRepository};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn state_with(db: Database) -> AppState {
        let db = Arc::new(db);
        AppState {
            channels: Arc::new(ChannelAggregator::new(db.pool_clone(), Duration::from_secs(3600))),
            db,
            segmentation: Arc::new(SegmentationConfig::default()),
        }
    }

    async fn two_channel_state() -> AppState {
        let db = Database::in_memory().await.unwrap();
        let ledger = LedgerRepository::new(db.pool());
        ledger.insert_account(&account("c1", "l1", "Реклама")).await.unwrap();
        ledger.insert_account(&account("c2", "l2", "partner")).await.unwrap();
        ledger.insert_account(&account("c2", "l3", "partner")).await.unwrap();
        ledger.insert_commission("l1", Some(100.0), Some("2024-01-01")).await.unwrap();
        ledger.insert_commission("l2", Some(20.0), Some("2024-01-01")).await.unwrap();
        ledger.insert_commission("l3", Some(5.5), Some("2024-02-01")).await.unwrap();
        state_with(db).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_commission_sum_endpoint() {
        let state = two_channel_state().await;
        let (status, body) = get_json(app(state), "/api/channels?type=commission_sum").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                { "channel": "Реклама", "total_commission": 100.0 },
                { "channel": "partner", "total_commission": 25.5 },
            ])
        );
    }

    #[tokio::test]
    async fn test_unknown_type_defaults_to_user_count() {
        let state = two_channel_state().await;
        let (status, body) = get_json(app(state), "/api/channels?type=nonsense").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                { "channel": "partner", "user_count": 2 },
                { "channel": "Реклама", "user_count": 1 },
            ])
        );
    }

    #[tokio::test]
    async fn test_query_failure_returns_error_payload() {
        let state = two_channel_state().await;
        state.db.pool().close().await;

        let (status, body) = get_json(app(state), "/api/channels?type=lifetime").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_segments_with_too_few_clients_is_an_error() {
        let state = two_channel_state().await;
        let (status, body) = get_json(app(state), "/api/segments?as_of=2024-06-01").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("Insufficient data"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn test_segments_rejects_bad_date() {
        let state = two_channel_state().await;
        let (status, body) = get_json(app(state), "/api/segments?as_of=01-06-2024").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("01-06-2024"));
    }

    #[tokio::test]
    async fn test_health() {
        let state = two_channel_state().await;
        let (status, body) = get_json(app(state), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "broker-segments");
    }
}
