// handlers.rs

use crate::{
    error::AppError,
    models::{AppState, BridgeState, BridgeConfig, CreateUserRequest, CreateUserResponse, RenameLightRequest},
    utils,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{Method, Uri},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

type Payload<T> = Result<Json<T>, JsonRejection>;

/// `(username, id)` captured from `/api/{username}/<resource>/{id}`.
type ResourcePath = Path<(String, String)>;

fn body<T>(payload: Payload<T>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))
}

async fn read_path(state: &AppState, path: &str) -> Result<Json<Value>, AppError> {
    state.store.get_state_path(path).await.map(Json)
}

/// Wipes the stored state and writes the seed document.
#[utoipa::path(
    get,
    path = "/bootstrap",
    responses((status = 200, description = "Seed document now in place", body = BridgeState)),
    tag = "bootstrap"
)]
pub async fn bootstrap(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let document = state.store.reset(&state.seed).await?;
    info!("bridge state bootstrapped");
    Ok(Json(document))
}

#[utoipa::path(
    post,
    path = "/api",
    request_body = CreateUserRequest,
    responses((status = 200, description = "User registered, or a bridge error", body = CreateUserResponse)),
    tag = "config"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Payload<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, AppError> {
    let request = body(payload)?;
    request.validate().map_err(|e| {
        AppError::Validation(e.field_errors().keys().map(|k| k.to_string()).collect())
    })?;

    let username = state.store.create_user(&request.devicetype).await?;
    Ok(Json(CreateUserResponse {
        devicetype: request.devicetype,
        username,
    }))
}

#[utoipa::path(
    get,
    path = "/api/{username}",
    params(("username" = String, Path, description = "Whitelisted username")),
    responses((status = 200, description = "Full bridge state", body = BridgeState)),
    tag = "config"
)]
pub async fn get_full_state(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    state.store.get_full_state().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/{username}/config",
    params(("username" = String, Path, description = "Whitelisted username")),
    responses((status = 200, description = "Bridge configuration", body = BridgeConfig)),
    tag = "config"
)]
pub async fn get_config(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    read_path(&state, "config").await
}

#[utoipa::path(
    get,
    path = "/api/{username}/lights",
    params(("username" = String, Path, description = "Whitelisted username")),
    responses((status = 200, description = "All lights keyed by id")),
    tag = "lights"
)]
pub async fn get_all_lights(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    read_path(&state, "lights").await
}

#[utoipa::path(
    get,
    path = "/api/{username}/lights/{id}",
    params(
        ("username" = String, Path, description = "Whitelisted username"),
        ("id" = String, Path, description = "Light id"),
    ),
    responses((status = 200, description = "One light", body = crate::models::Light)),
    tag = "lights"
)]
pub async fn get_light(
    State(state): State<Arc<AppState>>,
    Path((_username, id)): ResourcePath,
) -> Result<Json<Value>, AppError> {
    read_path(&state, &format!("lights.{}", id)).await
}

/// Renames a light; the response carries the name actually stored.
#[utoipa::path(
    put,
    path = "/api/{username}/lights/{id}",
    params(
        ("username" = String, Path, description = "Whitelisted username"),
        ("id" = String, Path, description = "Light id"),
    ),
    request_body = RenameLightRequest,
    responses((status = 200, description = "`{\"/lights/<id>/name\": name}`")),
    tag = "lights"
)]
pub async fn rename_light(
    State(state): State<Arc<AppState>>,
    Path((_username, id)): ResourcePath,
    payload: Payload<RenameLightRequest>,
) -> Result<Json<Value>, AppError> {
    let request = body(payload)?;
    request
        .validate()
        .map_err(|_| AppError::Validation(vec!["name".to_string()]))?;
    let requested = request.name.ok_or(AppError::MissingParameter("name"))?;

    let name = state.store.rename_light(&id, &requested).await?;
    info!("successfully changed name");

    let mut response = Map::new();
    response.insert(format!("/lights/{}/name", id), Value::String(name));
    Ok(Json(Value::Object(response)))
}

/// Applies a partial light state; one `{"/lights/<id>/<field>": value}`
/// entry per applied field.
#[utoipa::path(
    put,
    path = "/api/{username}/lights/{id}/state",
    params(
        ("username" = String, Path, description = "Whitelisted username"),
        ("id" = String, Path, description = "Light id"),
    ),
    responses((status = 200, description = "Applied fields")),
    tag = "lights"
)]
pub async fn set_light_state(
    State(state): State<Arc<AppState>>,
    Path((_username, id)): ResourcePath,
    payload: Payload<Map<String, Value>>,
) -> Result<Json<Vec<Value>>, AppError> {
    let patch = body(payload)?;
    let applied = state.store.set_light_state(&id, patch).await?;
    info!("successfully updated light state");

    let entries = applied
        .into_iter()
        .map(|(key, value)| {
            let mut entry = Map::new();
            entry.insert(format!("/lights/{}/{key}", id), value);
            Value::Object(entry)
        })
        .collect();
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/{username}/groups",
    params(("username" = String, Path, description = "Whitelisted username")),
    responses((status = 200, description = "All groups keyed by id")),
    tag = "groups"
)]
pub async fn get_all_groups(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    read_path(&state, "groups").await
}

#[utoipa::path(
    get,
    path = "/api/{username}/groups/{id}",
    params(
        ("username" = String, Path, description = "Whitelisted username"),
        ("id" = String, Path, description = "Group id"),
    ),
    responses((status = 200, description = "One group")),
    tag = "groups"
)]
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path((_username, id)): ResourcePath,
) -> Result<Json<Value>, AppError> {
    read_path(&state, &format!("groups.{}", id)).await
}

#[utoipa::path(
    get,
    path = "/api/{username}/schedules",
    params(("username" = String, Path, description = "Whitelisted username")),
    responses((status = 200, description = "All schedules keyed by id")),
    tag = "schedules"
)]
pub async fn get_all_schedules(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    read_path(&state, "schedules").await
}

#[utoipa::path(
    get,
    path = "/api/{username}/schedules/{id}",
    params(
        ("username" = String, Path, description = "Whitelisted username"),
        ("id" = String, Path, description = "Schedule id"),
    ),
    responses((status = 200, description = "One schedule")),
    tag = "schedules"
)]
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path((_username, id)): ResourcePath,
) -> Result<Json<Value>, AppError> {
    read_path(&state, &format!("schedules.{}", id)).await
}

/// Declared endpoints with no behavior behind them yet.
pub async fn not_implemented(method: Method, uri: Uri) -> AppError {
    AppError::NotImplemented {
        method: method.to_string(),
        address: utils::resource_address(uri.path()),
    }
}
