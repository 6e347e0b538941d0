// validation.rs
//! Field checks run against the `lights` mapping before every save.

use serde_json::Value;
use tracing::{debug, error};

const ALERTS: &[&str] = &["none", "select", "lselect"];
const EFFECTS: &[&str] = &["none", "colorloop"];
const COLOR_MODES: &[&str] = &["hs", "xy", "ct"];

pub const MAX_NAME_LEN: usize = 32;

/// Clamped value when `value` is a number, `None` otherwise.
///
/// Only numeric-ness decides the check; the clamped value is informational.
fn bounded_number(value: Option<&Value>, low: f64, high: f64, field: &str) -> Option<f64> {
    let raw = value?.as_f64()?;
    let clamped = raw.clamp(low, high);
    if clamped != raw {
        debug!(field, raw, clamped, "value outside bounds");
    }
    Some(clamped)
}

fn valid_enum(value: Option<&Value>, allowed: &[&str], field: &str) -> bool {
    let pass = value
        .and_then(Value::as_str)
        .is_some_and(|v| allowed.contains(&v));
    if !pass {
        error!(field, "VALIDATION_FAILED");
    }
    pass
}

/// Names of the fields of one light that fail their check.
fn light_failures(light: &Value) -> Vec<&'static str> {
    let state = light.get("state");
    let field = |name: &str| state.and_then(|s| s.get(name));
    let xy = field("xy");

    let checks = [
        ("bri", bounded_number(field("bri"), 0.0, 255.0, "bri").is_some()),
        ("hue", bounded_number(field("hue"), 0.0, 65535.0, "hue").is_some()),
        ("sat", bounded_number(field("sat"), 0.0, 255.0, "sat").is_some()),
        ("ct", bounded_number(field("ct"), 153.0, 500.0, "ct").is_some()),
        ("alert", valid_enum(field("alert"), ALERTS, "alert")),
        ("effect", valid_enum(field("effect"), EFFECTS, "effect")),
        ("colormode", valid_enum(field("colormode"), COLOR_MODES, "colormode")),
        ("on", field("on").is_some_and(Value::is_boolean)),
        (
            "xy",
            bounded_number(xy.and_then(|v| v.get(0)), 0.0, 1.0, "xy[0]").is_some()
                & bounded_number(xy.and_then(|v| v.get(1)), 0.0, 1.0, "xy[1]").is_some(),
        ),
        (
            "name",
            light
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.chars().count() < MAX_NAME_LEN),
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, pass)| !pass)
        .map(|(name, _)| name)
        .collect()
}

/// Every failing `<lightId>.<field>` in the mapping. Every light and every
/// check is evaluated so all enum failures get logged.
fn invalid_fields(lights: &Value) -> Vec<String> {
    let Some(lights) = lights.as_object() else {
        error!("lights is not a mapping");
        return vec!["lights".to_string()];
    };

    lights
        .iter()
        .flat_map(|(id, light)| {
            light_failures(light)
                .into_iter()
                .map(move |field| format!("{id}.{field}"))
        })
        .collect()
}

/// Passes when every light passes every check; otherwise lists the failures.
pub fn validate_lights(lights: &Value) -> Result<(), Vec<String>> {
    let failures = invalid_fields(lights);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
