use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod docs;
pub mod health;
pub mod public;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(public::router())
        .merge(sse::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig, services::feed_transport::testing::MemoryConnector, state::AppState,
    };

    fn app() -> (SharedState, Router<()>) {
        let (connector, _peers) = MemoryConnector::new();
        let state = AppState::new(AppConfig::default(), Arc::new(connector));
        (state.clone(), router(state))
    }

    fn post_json(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("x-admin-token", token);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn admin_routes_require_the_issued_token() {
        let (state, app) = app();

        let response = app
            .clone()
            .oneshot(post_json("/admin/countdown/start", None, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        *state.admin_token().lock().await = Some("secret".into());
        let response = app
            .clone()
            .oneshot(post_json("/admin/countdown/start", Some("wrong"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(post_json(
                "/admin/countdown/start",
                Some("secret"),
                r#"{"duration_secs":30}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["started"], true);
        assert_eq!(json["countdown"]["remaining"], 30);
    }

    #[tokio::test]
    async fn out_of_range_duration_is_rejected() {
        let (state, app) = app();
        *state.admin_token().lock().await = Some("secret".into());

        let response = app
            .oneshot(post_json(
                "/admin/countdown/start",
                Some("secret"),
                r#"{"duration_secs":0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!state.read_session(|s| s.countdown_running()).await);
    }

    #[tokio::test]
    async fn commands_after_teardown_conflict() {
        let (state, app) = app();
        *state.admin_token().lock().await = Some("secret".into());

        let response = app
            .clone()
            .oneshot(post_json("/admin/session/teardown", Some("secret"), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json("/admin/celebration/activate", Some("secret"), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn public_views_are_served() {
        let (_state, app) = app();

        let response = app
            .clone()
            .oneshot(Request::get("/public/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["feed"]["phase"], "loading");

        let response = app
            .oneshot(Request::get("/healthcheck").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "degraded");
    }
}
