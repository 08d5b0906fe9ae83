use crate::flow::error::FieldViolation;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string. `non_empty` rejects blank strings.
    Text { non_empty: bool },
    /// An ordered list of strings, possibly empty.
    TextList,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
}

/// Structural schema of a flow's input or output object.
///
/// Every declared field is required. Unknown fields are tolerated on
/// validation but never advertised in the exported JSON schema.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Shape {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Checks `value` against the shape and reports every offending field.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<FieldViolation>> {
        let Some(object) = value.as_object() else {
            return Err(vec![FieldViolation::new(
                self.name,
                format!("expected an object, got {}", type_name(value)),
            )]);
        };

        let violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|field| check_field(field, object).err())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// JSON schema handed to the completion service for structured decoding.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                let schema = match field.kind {
                    FieldKind::Text { .. } => json!({
                        "type": "string",
                        "description": field.description,
                    }),
                    FieldKind::TextList => json!({
                        "type": "array",
                        "items": { "type": "string" },
                        "description": field.description,
                    }),
                };
                (field.name.to_string(), schema)
            })
            .collect();

        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

fn check_field(field: &Field, object: &Map<String, Value>) -> Result<(), FieldViolation> {
    let Some(value) = object.get(field.name) else {
        return Err(FieldViolation::new(field.name, "is required"));
    };

    match (field.kind, value) {
        (FieldKind::Text { non_empty }, Value::String(s)) => {
            if non_empty && s.trim().is_empty() {
                Err(FieldViolation::new(field.name, "must not be empty"))
            } else {
                Ok(())
            }
        }
        (FieldKind::TextList, Value::Array(items)) => {
            match items.iter().position(|item| !item.is_string()) {
                Some(index) => Err(FieldViolation::new(
                    field.name,
                    format!(
                        "item {index} must be a string, got {}",
                        type_name(&items[index])
                    ),
                )),
                None => Ok(()),
            }
        }
        (FieldKind::Text { .. }, other) => Err(FieldViolation::new(
            field.name,
            format!("must be a string, got {}", type_name(other)),
        )),
        (FieldKind::TextList, other) => Err(FieldViolation::new(
            field.name,
            format!("must be a list of strings, got {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
