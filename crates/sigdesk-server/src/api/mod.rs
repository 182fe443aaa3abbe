mod actions;
mod companies;
mod people;
mod search;
mod signals;
mod sync;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sigdesk_analyze::AnalysisBackend;
use sigdesk_core::AppConfig;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub backend: Arc<AnalysisBackend>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    usize::try_from(limit.unwrap_or(50).clamp(1, 200)).unwrap_or(50)
}

pub(super) fn map_db_error(request_id: String, error: &sigdesk_db::DbError) -> ApiError {
    if matches!(error, sigdesk_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "record not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/api/v1/companies/{id}",
            get(companies::get_company)
                .patch(companies::update_company)
                .delete(companies::delete_company),
        )
        .route(
            "/api/v1/people",
            get(people::list_people).post(people::create_person),
        )
        .route(
            "/api/v1/people/{id}",
            get(people::get_person)
                .patch(people::update_person)
                .delete(people::delete_person),
        )
        .route(
            "/api/v1/signals",
            get(signals::list_signals).post(signals::create_signal),
        )
        .route(
            "/api/v1/signals/{id}",
            get(signals::get_signal)
                .patch(signals::update_signal)
                .delete(signals::delete_signal),
        )
        .route("/api/v1/signals/actions", post(actions::record_action))
        .route(
            "/api/v1/signals/actions/metrics",
            get(actions::action_metrics),
        )
        .route("/api/v1/sync/{source}", post(sync::trigger_sync))
        .route("/api/v1/search", post(search::search))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        )))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match sigdesk_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use sigdesk_core::app_config::Environment;
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: String::new(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "info".to_owned(),
            anthropic_api_key: None,
            producthunt_api_token: None,
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            fetch_timeout_secs: 5,
            fetch_user_agent: "sigdesk-test/0.1".to_owned(),
            analysis_timeout_secs: 5,
            analysis_batch_size: 3,
            analysis_batch_delay_ms: 0,
            fetch_max_retries: 0,
            fetch_retry_backoff_base_secs: 0,
        }
    }

    fn test_app(pool: PgPool) -> Router {
        build_app(
            AppState {
                pool,
                config: Arc::new(test_config()),
                backend: Arc::new(AnalysisBackend::Disabled),
            },
            default_rate_limit_state(),
        )
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok(pool: PgPool) {
        let (status, json) = get_json(test_app(pool), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn incoming_request_id_is_echoed_back(pool: PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-abc-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.to_str().unwrap()),
            Some("req-abc-123")
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn rate_limit_rejects_after_the_window_fills(pool: PgPool) {
        let app = build_app(
            AppState {
                pool,
                config: Arc::new(test_config()),
                backend: Arc::new(AnalysisBackend::Disabled),
            },
            RateLimitState::new(2, Duration::from_secs(60)),
        );

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/v1/companies")
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/companies")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    // -------------------------------------------------------------------------
    // Companies and people CRUD
    // -------------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn company_crud_round_trip(pool: PgPool) {
        let app = test_app(pool);

        let (status, json) = post_json(
            app.clone(),
            "/api/v1/companies",
            serde_json::json!({
                "name": "Anvil Labs",
                "description": "Forge tooling",
                "tags": ["devtools"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json["data"]["id"].as_str().expect("company id").to_owned();

        let (status, json) = get_json(app.clone(), &format!("/api/v1/companies/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"].as_str(), Some("Anvil Labs"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/v1/companies/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"industry":"Developer Tools"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let (_, json) = get_json(app.clone(), &format!("/api/v1/companies/{id}")).await;
        assert_eq!(json["data"]["industry"].as_str(), Some("Developer Tools"));
        assert_eq!(json["data"]["name"].as_str(), Some("Anvil Labs"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/companies/{id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let (status, _) = get_json(app, &format!("/api/v1/companies/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn company_create_requires_a_name(pool: PgPool) {
        let (status, json) = post_json(
            test_app(pool),
            "/api/v1/companies",
            serde_json::json!({ "name": "   " }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn person_create_links_to_nothing_by_default(pool: PgPool) {
        let app = test_app(pool);
        let (status, json) = post_json(
            app.clone(),
            "/api/v1/people",
            serde_json::json!({ "name": "Ada Park", "title": "CTO" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["data"]["company_id"].is_null());

        let (_, json) = get_json(app, "/api/v1/people").await;
        let people = json["data"].as_array().expect("data array");
        assert_eq!(people.len(), 1);
        assert_eq!(people[0]["name"].as_str(), Some("Ada Park"));
    }

    // -------------------------------------------------------------------------
    // Signals and actions
    // -------------------------------------------------------------------------

    async fn seed_signal(app: &Router, headline: &str, score: i64) -> String {
        let (status, json) = post_json(
            app.clone(),
            "/api/v1/signals",
            serde_json::json!({
                "headline": headline,
                "score": score,
                "status": "published"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["data"]["id"].as_str().expect("signal id").to_owned()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn signals_default_listing_is_published_by_score(pool: PgPool) {
        let app = test_app(pool);
        seed_signal(&app, "Low", 3).await;
        seed_signal(&app, "High", 9).await;

        // Drafts stay out of the default listing.
        let (status, json) = post_json(
            app.clone(),
            "/api/v1/signals",
            serde_json::json!({ "headline": "Draft item" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["status"].as_str(), Some("draft"));

        let (_, json) = get_json(app.clone(), "/api/v1/signals").await;
        let listed = json["data"].as_array().expect("data array");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["headline"].as_str(), Some("High"));
        assert_eq!(listed[1]["headline"].as_str(), Some("Low"));

        let (_, json) = get_json(app, "/api/v1/signals?status=all").await;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(3));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_action_is_rejected(pool: PgPool) {
        let app = test_app(pool);
        let id = seed_signal(&app, "Item", 5).await;

        let (status, json) = post_json(
            app,
            "/api/v1/signals/actions",
            serde_json::json!({ "signal_id": id, "action": "bookmark" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn action_against_a_missing_signal_is_404(pool: PgPool) {
        let (status, _) = post_json(
            test_app(pool),
            "/api/v1/signals/actions",
            serde_json::json!({
                "signal_id": "00000000-0000-0000-0000-000000000000",
                "action": "acted"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn action_metrics_bucket_by_last_action(pool: PgPool) {
        let app = test_app(pool);

        // 4 acted, 2 useful, 1 ignored, 3 untouched.
        for i in 0..4 {
            let id = seed_signal(&app, &format!("acted-{i}"), 8).await;
            let (status, _) = post_json(
                app.clone(),
                "/api/v1/signals/actions",
                serde_json::json!({ "signal_id": id, "action": "acted" }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        for i in 0..2 {
            let id = seed_signal(&app, &format!("useful-{i}"), 6).await;
            post_json(
                app.clone(),
                "/api/v1/signals/actions",
                serde_json::json!({ "signal_id": id, "action": "useful" }),
            )
            .await;
        }
        let id = seed_signal(&app, "ignored-0", 2).await;
        post_json(
            app.clone(),
            "/api/v1/signals/actions",
            serde_json::json!({ "signal_id": id, "action": "ignore" }),
        )
        .await;
        for i in 0..3 {
            seed_signal(&app, &format!("untouched-{i}"), 5).await;
        }

        let (status, json) = get_json(app, "/api/v1/signals/actions/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["total_signals"].as_i64(), Some(10));
        assert_eq!(data["acted"].as_i64(), Some(4));
        assert_eq!(data["useful"].as_i64(), Some(2));
        assert_eq!(data["ignored"].as_i64(), Some(1));
        assert_eq!(data["no_action"].as_i64(), Some(3));
        assert_eq!(data["precision"].as_i64(), Some(86));
        assert!((data["avg_score_ignored"].as_f64().unwrap() - 2.0).abs() < f64::EPSILON);
    }

    // -------------------------------------------------------------------------
    // Sync and search
    // -------------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_of_an_unknown_source_is_404(pool: PgPool) {
        let (status, _) = post_json(
            test_app(pool),
            "/api/v1/sync/usenet",
            serde_json::json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_without_a_required_credential_is_400(pool: PgPool) {
        let (status, json) = post_json(
            test_app(pool),
            "/api/v1/sync/hackernews",
            serde_json::json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"].as_str(), Some("bad_request"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn jobs_sync_over_http_reports_imports(pool: PgPool) {
        let app = test_app(pool);
        let (status, json) = post_json(app, "/api/v1/sync/jobs", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["imported"].as_i64(), Some(10));
        assert_eq!(json["data"]["ai_enabled"].as_bool(), Some(false));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_requires_three_characters(pool: PgPool) {
        let (status, json) = post_json(
            test_app(pool),
            "/api/v1/search",
            serde_json::json!({ "query": "ai" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn keyword_search_ranks_phrase_hits_first(pool: PgPool) {
        let app = test_app(pool);
        seed_signal(&app, "Acme raises series B for warehouse robotics", 7).await;
        seed_signal(&app, "Weekly robotics roundup", 4).await;
        seed_signal(&app, "Unrelated fintech news", 5).await;

        let (status, json) = post_json(
            app,
            "/api/v1/search",
            serde_json::json!({ "query": "warehouse robotics" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["ai_powered"].as_bool(), Some(false));
        assert_eq!(data["has_results"].as_bool(), Some(true));
        let hits = data["results"]["signals"].as_array().expect("signal hits");
        assert_eq!(hits.len(), 2);
        assert_eq!(
            hits[0]["headline"].as_str(),
            Some("Acme raises series B for warehouse robotics")
        );
    }
}
