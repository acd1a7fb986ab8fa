use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod docs;
pub mod extract;
pub mod health;
pub mod names;
pub mod runs;
pub mod session;
pub mod stations;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(names::router())
        .merge(stations::router())
        .merge(session::router())
        .merge(runs::router())
        .merge(admin::router(state.clone()));

    api_router.merge(docs::router()).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, dao::run_store::MemoryRunStore, state::AppState};

    async fn app_with_store(config: AppConfig) -> (Router<()>, SharedState) {
        let state = AppState::new(config);
        state.set_run_store(Arc::new(MemoryRunStore::new())).await;
        (router(state.clone()), state)
    }

    async fn send(
        app: &Router<()>,
        method: &str,
        uri: &str,
        payload: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("x-admin-token", token);
        }
        let request = match payload {
            Some(payload) => builder
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn full_run_lands_on_the_leaderboard() {
        let (app, _state) = app_with_store(AppConfig::default()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/names/claim",
            Some(json!({"name": "Ann"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, body) = send(
            &app,
            "POST",
            "/names/claim",
            Some(json!({"name": "Ann"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            "POST",
            "/session",
            Some(json!({"name": "Ann"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ann");
        assert_eq!(body["victory"], false);

        let (status, _) = send(
            &app,
            "POST",
            "/session/finish",
            Some(json!({"reason": "victory"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        for station in ["local", "stl1", "stl2", "stl3", "stl4"] {
            let (status, body) = send(
                &app,
                "POST",
                &format!("/stations/{station}/status"),
                Some(json!({"status": "correct"})),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["applied"], true);
        }

        let (_, body) = send(&app, "GET", "/stations/victory", None, None).await;
        assert_eq!(body, json!({"victory": true}));

        let (status, finished) = send(
            &app,
            "POST",
            "/session/finish",
            Some(json!({"reason": "victory"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(finished["name"], "Ann");

        let (status, ranking) = send(&app, "GET", "/rankings?scope=all", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ranking, json!([{"name": "Ann", "time": finished["time"]}]));

        let (_, body) = send(&app, "GET", "/names/Ann", None, None).await;
        assert_eq!(body, json!({"name": "Ann", "claimed": false}));

        let (status, _) = send(&app, "GET", "/session", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn remote_reports_show_up_in_the_station_listing() {
        let (app, _state) = app_with_store(AppConfig::default()).await;
        send(
            &app,
            "POST",
            "/stations/remote",
            Some(json!({"satellite": "stl2", "status": "wrong"})),
            None,
        )
        .await;

        let (status, body) = send(&app, "GET", "/stations", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["local", "stl1", "stl2", "stl3", "stl4"]);
        assert_eq!(body["stl2"], "incorrect");
    }

    #[tokio::test]
    async fn malformed_bodies_use_the_error_shape() {
        let (app, _state) = app_with_store(AppConfig::default()).await;

        let (status, body) = send(&app, "POST", "/runs", Some(json!({"name": "Bo"})), None).await;
        assert!(status.is_client_error());
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            "POST",
            "/runs",
            Some(json!({"name": "Bo", "time": "1:02"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "GET", "/rankings?limit=0", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn leaderboard_routes_report_degraded_mode() {
        let app = router(AppState::new(AppConfig::default()));

        let (status, body) = send(
            &app,
            "POST",
            "/runs",
            Some(json!({"name": "Bo", "time": "00:01:02.003"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "GET", "/healthcheck", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "degraded"}));

        let (status, _) = send(
            &app,
            "POST",
            "/names/claim",
            Some(json!({"name": "Bo"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_require_the_configured_token() {
        let config = AppConfig {
            admin_token: Some("s3cret".into()),
            ..AppConfig::default()
        };
        let (app, _state) = app_with_store(config).await;

        let (status, body) = send(&app, "GET", "/admin/runs", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, "GET", "/admin/runs", None, Some("nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            "POST",
            "/admin/runs",
            Some(json!([
                {"name": "Ann", "time": "00:00:58.000", "recorded_at": "2024-05-01T10:00:00Z"},
                {"id": 42, "name": "Bo", "time": "00:01:00.000"}
            ])),
            Some("s3cret"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"updated": 0, "inserted": [1], "skipped": [42]}));

        let (status, body) = send(&app, "GET", "/admin/runs", None, Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["recorded_at"], "2024-05-01T10:00:00Z");

        let (status, body) = send(
            &app,
            "POST",
            "/admin/runs/delete",
            Some(json!([1, 999])),
            Some("s3cret"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"deleted": 1}));
    }

    #[tokio::test]
    async fn admin_routes_are_open_without_a_token() {
        let (app, state) = app_with_store(AppConfig::default()).await;
        state.names().try_claim("Ann").unwrap();

        let (status, _) = send(&app, "POST", "/admin/reset", None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.names().is_empty());
    }

    #[tokio::test]
    async fn openapi_document_lists_the_session_routes() {
        let (app, _state) = app_with_store(AppConfig::default()).await;

        let (status, doc) = send(&app, "GET", docs::OPENAPI_JSON_PATH, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/session/finish"]["post"].is_object());
        assert!(doc["paths"]["/admin/runs/delete"]["post"].is_object());
    }

    #[tokio::test]
    async fn buzzer_press_is_reported_once() {
        let (app, _state) = app_with_store(AppConfig::default()).await;

        let (status, _) = send(&app, "POST", "/buzzer", None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, "GET", "/buzzer", None, None).await;
        assert_eq!(body, json!({"clicked": true}));
        let (_, body) = send(&app, "GET", "/buzzer", None, None).await;
        assert_eq!(body, json!({"clicked": false}));

        let (_, body) = send(&app, "POST", "/activity", None, None).await;
        assert_eq!(body, json!({"idle": false}));
    }
}
