//! Agent-wide settings
//!
//! Both documents are open-ended JSON objects owned by the agent. They are
//! read and written whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `GET/POST /general_configs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneralConfigs(pub Map<String, Value>);

impl GeneralConfigs {
    /// Converts `update_info.enable_update_check` from `"true"`/`"false"` to a boolean.
    pub fn normalize(mut self) -> Self {
        if let Some(Value::Object(update_info)) = self.0.get_mut("update_info") {
            if let Some(Value::String(flag)) = update_info.get("enable_update_check") {
                let enabled = flag == "true";
                update_info.insert("enable_update_check".into(), Value::Bool(enabled));
            }
        }
        self
    }

    /// Value at a dotted key such as `update_info.enable_update_check`.
    pub fn get_path(&self, key: &str) -> Option<&Value> {
        lookup(&self.0, key)
    }

    /// Sets the value at a dotted key, creating intermediate objects.
    pub fn set_path(&mut self, key: &str, value: Value) {
        assign(&mut self.0, key, value);
    }
}

/// Body of `GET/POST /proxy`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxySettings(pub Map<String, Value>);

impl ProxySettings {
    pub fn get_path(&self, key: &str) -> Option<&Value> {
        lookup(&self.0, key)
    }

    pub fn set_path(&mut self, key: &str, value: Value) {
        assign(&mut self.0, key, value);
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn assign(map: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            map.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                assign(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_string_flag() {
        let configs: GeneralConfigs = serde_json::from_value(json!({
            "update_info": {"enable_update_check": "true", "update_check_frequency_days": 1}
        }))
        .unwrap();
        let configs = configs.normalize();
        assert_eq!(
            configs.get_path("update_info.enable_update_check"),
            Some(&json!(true))
        );

        let configs: GeneralConfigs =
            serde_json::from_value(json!({"update_info": {"enable_update_check": "no"}})).unwrap();
        assert_eq!(
            configs.normalize().get_path("update_info.enable_update_check"),
            Some(&json!(false))
        );
    }

    #[test]
    fn test_normalize_without_update_info() {
        let configs: GeneralConfigs = serde_json::from_value(json!({"language": "en"})).unwrap();
        assert_eq!(configs.clone().normalize(), configs);
    }

    #[test]
    fn test_set_path_creates_objects() {
        let mut proxy = ProxySettings::default();
        proxy.set_path("http.hostname", json!("proxy.local"));
        proxy.set_path("http.port", json!(3128));
        assert_eq!(proxy.get_path("http.port"), Some(&json!(3128)));
        assert_eq!(
            serde_json::to_value(&proxy).unwrap(),
            json!({"http": {"hostname": "proxy.local", "port": 3128}})
        );
    }
}
