use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Raw field map of a stored document.
pub type DocumentData = serde_json::Map<String, Value>;

/// A document as returned by the store: an opaque id plus its fields.
///
/// Snapshots are never consumed shape-blind; callers parse them into a
/// typed record with [`Document::parse`] and treat mismatches as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: DocumentData,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: DocumentData) -> Self {
        Self { id: id.into(), fields }
    }

    /// Parse-and-validate boundary: deserialize the fields into a typed
    /// record, failing on any shape violation.
    pub fn parse<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .with_context(|| format!("document '{}' does not match the expected schema", self.id))
    }

    /// Borrow a raw field value, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Serialize a typed record into a raw field map for writing.
pub fn to_fields<T: Serialize>(record: &T) -> anyhow::Result<DocumentData> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("record serialized to {} instead of an object", type_name(&other)),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
