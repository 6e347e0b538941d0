use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::state::BridgeStore;

/// The single document holding everything the bridge knows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BridgeState {
    pub lights: BTreeMap<String, Light>,
    #[schema(value_type = Object)]
    pub groups: BTreeMap<String, Value>,
    pub config: BridgeConfig,
    #[schema(value_type = Object)]
    pub schedules: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Light {
    pub name: String,
    pub state: LightState,
    #[serde(rename = "type")]
    pub light_type: String,
    pub modelid: String,
    pub swversion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LightState {
    pub on: bool,
    pub bri: u8,
    pub hue: u16,
    pub sat: u8,
    pub ct: u16,
    pub alert: Alert,
    pub effect: Effect,
    pub colormode: ColorMode,
    #[schema(value_type = Vec<f64>)]
    pub xy: [f64; 2],
    pub reachable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Alert {
    None,
    Select,
    Lselect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    None,
    Colorloop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Hs,
    Xy,
    Ct,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BridgeConfig {
    pub name: String,
    pub mac: String,
    pub dhcp: bool,
    pub ipaddress: String,
    pub netmask: String,
    pub gateway: String,
    pub proxyaddress: String,
    pub proxyport: u16,
    #[serde(rename = "UTC")]
    pub utc: String,
    pub whitelist: BTreeMap<String, WhitelistEntry>,
    pub swversion: String,
    #[schema(value_type = Object)]
    pub swupdate: Value,
    pub linkbutton: bool,
    pub portalservices: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WhitelistEntry {
    #[serde(rename = "last use date")]
    pub last_use_date: String,
    #[serde(rename = "create date")]
    pub create_date: String,
    /// Device type supplied at registration.
    pub name: String,
}

impl Light {
    fn hue_lamp(name: &str, hue: u16) -> Self {
        Self {
            name: name.to_string(),
            state: LightState {
                on: true,
                bri: 254,
                hue,
                sat: 144,
                ct: 467,
                alert: Alert::None,
                effect: Effect::None,
                colormode: ColorMode::Ct,
                xy: [0.5128, 0.4147],
                reachable: true,
            },
            light_type: "Extended color light".to_string(),
            modelid: "LCT001".to_string(),
            swversion: "66009461".to_string(),
        }
    }
}

impl BridgeState {
    /// Document written by `/bootstrap` when no seed file is configured.
    pub fn seed() -> Self {
        let lights = [
            ("1", Light::hue_lamp("Hue Lamp 1", 13122)),
            ("2", Light::hue_lamp("Hue Lamp 2", 14922)),
            ("3", Light::hue_lamp("Hue Lamp 3", 46920)),
        ]
        .into_iter()
        .map(|(id, light)| (id.to_string(), light))
        .collect();

        let groups = BTreeMap::from([(
            "1".to_string(),
            serde_json::json!({
                "name": "Living room",
                "lights": ["1", "2", "3"],
                "action": { "on": true, "bri": 254, "alert": "none", "effect": "none" }
            }),
        )]);

        Self {
            lights,
            groups,
            config: BridgeConfig {
                name: "Philips hue".to_string(),
                mac: "00:17:88:00:00:00".to_string(),
                dhcp: true,
                ipaddress: "192.168.1.2".to_string(),
                netmask: "255.255.255.0".to_string(),
                gateway: "192.168.1.1".to_string(),
                proxyaddress: String::new(),
                proxyport: 0,
                utc: "2012-10-29T12:00:00".to_string(),
                whitelist: BTreeMap::new(),
                swversion: "01003372".to_string(),
                swupdate: serde_json::json!({
                    "updatestate": 0,
                    "url": "",
                    "text": "",
                    "notify": false
                }),
                linkbutton: false,
                portalservices: false,
            },
            schedules: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 40))]
    pub devicetype: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    pub devicetype: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameLightRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

pub struct AppState {
    pub store: Arc<BridgeStore>,
    /// Document restored by `/bootstrap`.
    pub seed: Value,
}

impl AppState {
    pub fn new(store: Arc<BridgeStore>, seed: Value) -> Self {
        Self { store, seed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_serializes_with_bridge_field_names() {
        let doc = serde_json::to_value(BridgeState::seed()).unwrap();
        assert_eq!(doc["lights"]["1"]["type"], "Extended color light");
        assert_eq!(doc["lights"]["2"]["state"]["alert"], "none");
        assert_eq!(doc["lights"]["3"]["state"]["colormode"], "ct");
        assert!(doc["config"]["UTC"].is_string());
        assert!(doc["config"]["whitelist"].as_object().unwrap().is_empty());
        assert!(doc["schedules"].as_object().unwrap().is_empty());
    }

    #[test]
    fn whitelist_entry_uses_spaced_keys() {
        let entry = WhitelistEntry {
            last_use_date: "2024-01-01T00:00:00".into(),
            create_date: "2024-01-01T00:00:00".into(),
            name: "iphone".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["last use date"], "2024-01-01T00:00:00");
        assert_eq!(value["create date"], "2024-01-01T00:00:00");
        assert_eq!(value["name"], "iphone");
    }

    #[test]
    fn create_user_request_limits_devicetype() {
        let ok = CreateUserRequest { devicetype: "my app".into() };
        assert!(ok.validate().is_ok());
        let empty = CreateUserRequest { devicetype: String::new() };
        assert!(empty.validate().is_err());
        let long = CreateUserRequest { devicetype: "x".repeat(41) };
        assert!(long.validate().is_err());
    }
}
