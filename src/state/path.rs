// path.rs
use serde_json::Value;

/// One step into the document: the value stored under `key`, if `node`
/// is an object holding it.
pub fn child<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        _ => None,
    }
}

/// Walks a dot-delimited path such as `lights.1.state` from `root`.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "lights": { "1": { "name": "Lamp", "state": { "on": false, "bri": 0 } } },
            "config": { "whitelist": {} },
            "groups": { "1": { "lights": ["1"] } }
        })
    }

    #[test]
    fn resolves_nested_values() {
        let doc = doc();
        assert_eq!(resolve(&doc, "lights.1.name"), Some(&json!("Lamp")));
        assert_eq!(resolve(&doc, "config.whitelist"), Some(&json!({})));
        assert_eq!(resolve(&doc, "lights.1.state"), Some(&doc["lights"]["1"]["state"]));
    }

    #[test]
    fn falsy_values_still_resolve() {
        let doc = doc();
        assert_eq!(resolve(&doc, "lights.1.state.on"), Some(&json!(false)));
        assert_eq!(resolve(&doc, "lights.1.state.bri"), Some(&json!(0)));
    }

    #[test]
    fn missing_segments_do_not_resolve() {
        let doc = doc();
        assert!(resolve(&doc, "lights.2").is_none());
        assert!(resolve(&doc, "lights.2.state").is_none());
        assert!(resolve(&doc, "sensors").is_none());
        assert!(resolve(&doc, "").is_none());
        assert!(resolve(&doc, "lights.1.name.first").is_none());
    }

    #[test]
    fn arrays_are_not_indexed() {
        let doc = doc();
        assert!(resolve(&doc, "groups.1.lights.0").is_none());
    }
}
