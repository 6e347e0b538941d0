// routes.rs
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{auth, docs, handlers::*, models::AppState};

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/bootstrap", get(bootstrap))
        .route("/api", post(create_user))
        .route("/api/{username}", get(get_full_state))
        .route("/api/{username}/config", get(get_config).put(not_implemented))
        .route(
            "/api/{username}/config/whitelist/{username2}",
            delete(not_implemented),
        )
        .route("/api/{username}/lights", get(get_all_lights).post(not_implemented))
        .route("/api/{username}/lights/new", get(not_implemented))
        .route("/api/{username}/lights/{id}", get(get_light).put(rename_light))
        .route("/api/{username}/lights/{id}/state", put(set_light_state))
        .route("/api/{username}/groups", get(get_all_groups).post(not_implemented))
        .route(
            "/api/{username}/groups/{id}",
            get(get_group).put(not_implemented).delete(not_implemented),
        )
        .route("/api/{username}/groups/{id}/action", put(not_implemented))
        .route(
            "/api/{username}/schedules",
            get(get_all_schedules).post(not_implemented),
        )
        .route(
            "/api/{username}/schedules/{id}",
            get(get_schedule).put(not_implemented).delete(not_implemented),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth::check_username));

    api.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::BridgeState, state::BridgeStore, storage::MemoryStore};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app() -> (Router, Arc<AppState>) {
        let store = Arc::new(BridgeStore::new(Arc::new(MemoryStore::new())));
        let seed = serde_json::to_value(BridgeState::seed()).unwrap();
        store.reset(&seed).await.unwrap();
        let state = Arc::new(AppState::new(store, seed));
        (router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_success(), "status {}", response.status());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router) -> String {
        let body = send(app, "POST", "/api", Some(json!({ "devicetype": "test app" }))).await;
        assert_eq!(body["devicetype"], "test app");
        body["username"].as_str().unwrap().to_string()
    }

    fn unauthorized() -> Value {
        json!({ "error": { "type": 1, "address": "/", "description": "unauthorized user" } })
    }

    #[tokio::test]
    async fn unknown_username_is_rejected() {
        let (app, _) = app().await;
        assert_eq!(send(&app, "GET", "/api/stranger", None).await, unauthorized());
        assert_eq!(send(&app, "GET", "/api/stranger/lights", None).await, unauthorized());
        assert_eq!(send(&app, "POST", "/api", Some(json!({}))).await, unauthorized());
    }

    #[tokio::test]
    async fn registered_user_reads_state() {
        let (app, state) = app().await;
        let username = register(&app).await;
        assert!(state.store.whitelist().is_authorized(&username));

        let full = send(&app, "GET", &format!("/api/{username}"), None).await;
        assert_eq!(full["lights"]["1"]["name"], "Hue Lamp 1");
        assert!(full["config"]["whitelist"].get(&username).is_some());

        let config = send(&app, "GET", &format!("/api/{username}/config"), None).await;
        assert_eq!(config, full["config"]);

        let light = send(&app, "GET", &format!("/api/{username}/lights/2"), None).await;
        assert_eq!(light, full["lights"]["2"]);

        let groups = send(&app, "GET", &format!("/api/{username}/groups"), None).await;
        assert_eq!(groups, full["groups"]);
        let schedules = send(&app, "GET", &format!("/api/{username}/schedules"), None).await;
        assert_eq!(schedules, json!({}));
    }

    #[tokio::test]
    async fn unknown_resource_reports_address() {
        let (app, _) = app().await;
        let username = register(&app).await;

        let body = send(&app, "GET", &format!("/api/{username}/lights/77"), None).await;
        assert_eq!(body["error"]["type"], 3);
        assert_eq!(body["error"]["address"], "/lights/77");

        let body = send(&app, "GET", &format!("/api/{username}/schedules/1"), None).await;
        assert_eq!(body["error"]["address"], "/schedules/1");
    }

    #[tokio::test]
    async fn rename_returns_resolved_name() {
        let (app, _) = app().await;
        let username = register(&app).await;

        let uri = format!("/api/{username}/lights/2");
        let body = send(&app, "PUT", &uri, Some(json!({ "name": "Hue Lamp 1" }))).await;
        assert_eq!(body, json!({ "/lights/2/name": "Hue Lamp 1 1" }));

        let body = send(&app, "PUT", &uri, Some(json!({}))).await;
        assert_eq!(body["error"]["type"], 5);
    }

    #[tokio::test]
    async fn light_state_updates_are_echoed() {
        let (app, _) = app().await;
        let username = register(&app).await;

        let uri = format!("/api/{username}/lights/1/state");
        let body = send(&app, "PUT", &uri, Some(json!({ "on": false, "bri": 42 }))).await;
        assert_eq!(body, json!([{ "/lights/1/bri": 42 }, { "/lights/1/on": false }]));

        let state = send(&app, "GET", &format!("/api/{username}/lights/1"), None).await;
        assert_eq!(state["state"]["bri"], 42);
        assert_eq!(state["state"]["on"], false);
    }

    #[tokio::test]
    async fn invalid_light_state_is_rejected() {
        let (app, _) = app().await;
        let username = register(&app).await;

        let uri = format!("/api/{username}/lights/1/state");
        let body = send(&app, "PUT", &uri, Some(json!({ "effect": "disco" }))).await;
        assert_eq!(body["error"]["type"], 7);

        let light = send(&app, "GET", &format!("/api/{username}/lights/1"), None).await;
        assert_eq!(light["state"]["effect"], "none");
    }

    #[tokio::test]
    async fn declared_endpoints_are_not_implemented() {
        let (app, _) = app().await;
        let username = register(&app).await;

        let body = send(&app, "PUT", &format!("/api/{username}/config"), Some(json!({}))).await;
        assert_eq!(body["error"]["type"], 4);
        assert_eq!(body["error"]["address"], "/config");

        let uri = format!("/api/{username}/config/whitelist/{username}");
        let body = send(&app, "DELETE", &uri, None).await;
        assert_eq!(body["error"]["address"], format!("/config/whitelist/{username}"));

        let body = send(&app, "GET", &format!("/api/{username}/lights/new"), None).await;
        assert_eq!(body["error"]["type"], 4);
        let body = send(&app, "DELETE", &format!("/api/{username}/schedules/1"), None).await;
        assert_eq!(body["error"]["type"], 4);
    }

    #[tokio::test]
    async fn bootstrap_needs_no_user_and_revokes_users() {
        let (app, state) = app().await;
        let username = register(&app).await;
        send(&app, "PUT", &format!("/api/{username}/lights/1"), Some(json!({ "name": "Desk" }))).await;

        let doc = send(&app, "GET", "/bootstrap", None).await;
        assert_eq!(doc["lights"]["1"]["name"], "Hue Lamp 1");
        assert!(!state.store.whitelist().is_authorized(&username));
        assert_eq!(send(&app, "GET", &format!("/api/{username}"), None).await, unauthorized());
    }
}
