//! Tool specifications: name, description, and a typed parameter schema.
//!
//! The schema drives two things — the catalog text embedded in the decision
//! prompt, and argument validation before a call is ever dispatched.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Primitive parameter types the wire protocol supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// JSON Schema type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Check a JSON value against this kind. Integers accept any integral
    /// number; numbers accept any JSON number.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One named, typed parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamField {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
}

/// Ordered parameter schema for a tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParamSchema {
    fields: Vec<ParamField>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field. Builder style, declaration order is preserved.
    pub fn field(
        mut self,
        name: &str,
        kind: ParamKind,
        required: bool,
        description: &str,
    ) -> Self {
        self.fields.push(ParamField {
            name: name.to_string(),
            kind,
            required,
            description: description.to_string(),
        });
        self
    }

    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    /// Validate an argument mapping against this schema.
    ///
    /// Checks required fields, primitive type compatibility, and rejects
    /// arguments not declared in the schema (closed schemas). Returns a
    /// human-readable description of the first violation.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), String> {
        for field in &self.fields {
            match arguments.get(&field.name) {
                Some(value) => {
                    if !field.kind.accepts(value) {
                        return Err(format!(
                            "parameter '{}' expects {}, got {}",
                            field.name,
                            field.kind.type_name(),
                            json_type_name(value)
                        ));
                    }
                }
                None if field.required => {
                    return Err(format!("missing required parameter '{}'", field.name));
                }
                None => {}
            }
        }
        for key in arguments.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                return Err(format!("unexpected parameter '{}'", key));
            }
        }
        Ok(())
    }

    /// Render as a JSON-Schema-shaped object for prompts and wire formats.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                json!({
                    "type": field.kind.type_name(),
                    "description": field.description,
                }),
            );
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A tool's public contract: stable name, prompt description, parameters.
/// Registered once at startup and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: ParamSchema,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, params: ParamSchema) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
