use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A kind of resource (e.g. "Usher", "Sound desk"); all fields beyond `id`
/// are defined by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    #[serde(default)]
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceType {
    /// A new, unsaved resource type with the given name
    pub fn named(name: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("name".to_string(), Value::String(name.to_string()));
        Self { id: 0, extra }
    }

    pub fn name(&self) -> &str {
        self.extra.get("name").and_then(Value::as_str).unwrap_or("-")
    }
}
