// auth.rs
use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{error::AppError, models::AppState, utils};

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Lets a request through when it targets `/bootstrap`, names a whitelisted
/// user in its path, or registers a new user with a `devicetype` body.
pub async fn check_username(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if path.starts_with("/bootstrap") {
        return next.run(req).await;
    }
    if let Some(username) = utils::username_from_path(&path) {
        if state.store.whitelist().is_authorized(username) {
            debug!(username, "authorized");
            return next.run(req).await;
        }
    }

    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return AppError::InvalidBody(e.to_string()).into_response(),
    };
    if carries_devicetype(&bytes) {
        return next.run(Request::from_parts(parts, Body::from(bytes))).await;
    }

    counter!("bridge_unauthorized_total").increment(1);
    warn!(%path, "unauthorized user");
    AppError::Unauthorized.into_response()
}

fn carries_devicetype(body: &[u8]) -> bool {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("devicetype").and_then(Value::as_str).map(|d| !d.is_empty()))
        .unwrap_or(false)
}
