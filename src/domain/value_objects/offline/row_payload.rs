use super::RowId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column name to value mapping sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowPayload(Map<String, Value>);

impl RowPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err("Row payload cannot be null".to_string()),
            _ => Err("Row payload must be a JSON object".to_string()),
        }
    }

    pub fn with_id(id: &RowId) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(id.to_string()));
        Self(map)
    }

    pub fn id(&self) -> Option<RowId> {
        self.0.get("id").and_then(RowId::from_json)
    }

    /// Fields that are absent or null.
    pub fn missing_fields<'a>(&self, fields: &[&'a str]) -> Vec<&'a str> {
        fields
            .iter()
            .copied()
            .filter(|field| self.0.get(*field).map_or(true, Value::is_null))
            .collect()
    }

    pub fn set_id(&mut self, id: &RowId) {
        self.0
            .insert("id".to_string(), Value::String(id.to_string()));
    }

    /// Overlays the columns of `changes`; columns it does not name are kept.
    pub fn merge(&mut self, changes: &RowPayload) {
        for (column, value) in &changes.0 {
            self.0.insert(column.clone(), value.clone());
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<RowPayload> for Value {
    fn from(payload: RowPayload) -> Self {
        Value::Object(payload.0)
    }
}
