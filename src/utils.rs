// utils.rs
use chrono::Utc;

/// Current UTC time as the bridge writes it, e.g. `2012-11-04T14:51:06`.
pub fn bridge_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Resource address relative to the user, e.g. `/api/abc/lights/1` -> `/lights/1`.
pub fn resource_address(uri_path: &str) -> String {
    let mut segments = uri_path.trim_start_matches('/').splitn(3, '/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("api"), Some(_), Some(rest)) => format!("/{rest}"),
        _ => "/".to_string(),
    }
}

/// The `:username` segment of `/api/:username/...`.
pub fn username_from_path(uri_path: &str) -> Option<&str> {
    let mut segments = uri_path.trim_start_matches('/').split('/');
    match (segments.next(), segments.next()) {
        (Some("api"), Some(username)) if !username.is_empty() => Some(username),
        _ => None,
    }
}
