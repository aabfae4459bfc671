use std::net::SocketAddr;

use axum::{extract::Request, http::HeaderValue, routing::get, Json, Router, ServiceExt};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{analysis, diet_plan, food_logs};

/// Router wrapped so `/api/food-logs/` and `/api/food-logs` hit the same route.
pub type App = NormalizePath<Router>;

pub fn build_app(state: AppState) -> App {
    let cors = cors_layer(&state.config);

    let router = Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .merge(food_logs::router())
                .merge(analysis::router())
                .merge(diet_plan::router()),
        )
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        );

    NormalizePath::trim_trailing_slash(router)
}

async fn banner() -> Json<Value> {
    Json(json!({ "message": "FitBuddy API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn serve(app: App, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::scripted::ScriptedEngine,
        analysis::repo_types::NutrientEstimate,
        food_logs::repo_types::{MealTime, NewFoodLog},
        store::{memory::MemoryStore, FoodStore},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use time::macros::date;
    use tower::ServiceExt;

    fn app_with(engine: ScriptedEngine) -> (App, Arc<MemoryStore>, Arc<ScriptedEngine>) {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(engine);
        let app = build_app(AppState::fake(store.clone(), engine.clone()));
        (app, store, engine)
    }

    async fn send(app: App, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn seed(store: &MemoryStore, owner: i64, description: &str) -> i64 {
        store
            .create_log(
                owner,
                &NewFoodLog {
                    date: date!(2024 - 05 - 10),
                    meal_time: MealTime::Morning,
                    time: Some("08:00".into()),
                    food_description: description.into(),
                },
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, body) = send(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn create_then_fetch_food_log() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, created) = send(
            app.clone(),
            json_request(
                "POST",
                "/api/food-logs",
                json!({
                    "date": "2024-05-10",
                    "meal_time": "evening",
                    "time": "19:30",
                    "food_description": "  salmon with rice  "
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["food_description"], "salmon with rice");
        assert_eq!(created["date"], "2024-05-10");
        assert_eq!(created["meal_time"], "evening");

        let uri = format!("/api/food-logs/{}", created["id"]);
        let (status, fetched) = send(app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], created["id"]);
    }

    #[tokio::test]
    async fn invalid_food_log_is_bad_request() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/food-logs",
                json!({
                    "date": "2024-05-10",
                    "meal_time": "morning",
                    "time": "25:00",
                    "food_description": "toast"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn other_owners_logs_are_not_found() {
        let (app, store, _) = app_with(ScriptedEngine::new());
        let id = seed(&store, 2, "private lunch").await;

        let (status, body) = send(app.clone(), get(&format!("/api/food-logs/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Food log not found");

        let req = Request::get(format!("/api/food-logs/{id}"))
            .header("X-User-Id", "2")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_owner_header_is_rejected() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let req = Request::get("/api/food-logs")
            .header("X-User-Id", "abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_returns_no_content_then_not_found() {
        let (app, store, _) = app_with(ScriptedEngine::new());
        let id = seed(&store, 1, "bagel").await;
        store
            .insert_analysis(id, &NutrientEstimate::zeroed("x".into()))
            .await
            .unwrap();

        let uri = format!("/api/food-logs/{id}");
        let req = Request::delete(&uri).body(Body::empty()).unwrap();
        let (status, _) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(store.analysis_count(), 0);

        let req = Request::delete(&uri).body(Body::empty()).unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analyze_route_persists_once() {
        let reply = r#"{"calories": 250, "protein": 9, "carbs": 30, "fats": 10, "fiber": 2, "summary": "bagel"}"#;
        let (app, store, engine) = app_with(ScriptedEngine::new().reply(reply));
        let id = seed(&store, 1, "bagel").await;

        let (status, first) = send(
            app.clone(),
            json_request("POST", "/api/ai/analyze", json!({ "food_log_id": id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["calories"], 250.0);

        let (_, second) = send(
            app,
            json_request("POST", "/api/ai/analyze", json!({ "food_log_id": id })),
        )
        .await;
        assert_eq!(second["id"], first["id"]);
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn analyze_unknown_log_is_not_found() {
        let (app, _, engine) = app_with(ScriptedEngine::new());
        let (status, _) = send(
            app,
            json_request("POST", "/api/ai/analyze", json!({ "food_log_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn nutrients_for_empty_day() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, body) = send(app, get("/api/ai/nutrients/2024-05-11")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "no_entries", "date": "2024-05-11"}));
    }

    #[tokio::test]
    async fn nutrients_with_bad_date_is_bad_request() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, body) = send(app, get("/api/ai/nutrients/yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn diet_plan_needs_history() {
        let (app, store, _) = app_with(ScriptedEngine::new());
        seed(&store, 1, "toast").await;

        let req = Request::post("/api/diet-plan/generate?end_date=2024-05-10")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Need at least 3 days of food logs to generate a diet plan"
        );

        let (status, body) = send(app, get("/api/diet-plan")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No diet plan found. Generate one first.");
    }

    #[tokio::test]
    async fn trailing_slash_reaches_collection_routes() {
        let (app, store, _) = app_with(ScriptedEngine::new());
        seed(&store, 1, "porridge").await;

        let (status, body) = send(app.clone(), get("/api/food-logs/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _) = send(
            app.clone(),
            json_request(
                "POST",
                "/api/food-logs/",
                json!({"date": "2024-05-11", "meal_time": "afternoon", "food_description": "soup"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(app, get("/api/diet-plan/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No diet plan found. Generate one first.");
    }

    #[tokio::test]
    async fn unknown_meal_time_is_json_bad_request() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/food-logs",
                json!({"date": "2024-05-10", "meal_time": "brunch", "food_description": "eggs"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("brunch"));
    }

    #[tokio::test]
    async fn malformed_end_date_is_json_bad_request() {
        let (app, _, engine) = app_with(ScriptedEngine::new());
        let req = Request::post("/api/diet-plan/generate?end_date=yesterday")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("YYYY-MM-DD"));
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn blank_date_filter_lists_everything() {
        let (app, store, _) = app_with(ScriptedEngine::new());
        seed(&store, 1, "toast").await;
        seed(&store, 1, "tea").await;

        let (status, body) = send(app, get("/api/food-logs?date=")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn non_numeric_id_is_json_bad_request() {
        let (app, _, _) = app_with(ScriptedEngine::new());
        let (status, body) = send(app, get("/api/food-logs/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }
}
