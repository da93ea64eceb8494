#![deny(missing_docs)]

//! # Type Inference
//!
//! Turns observed payloads into schema descriptions with example values.
//!
//! JSON bodies are decoded and walked structurally into a [`SchemaNode`].
//! Form-encoded bodies have no typed values, so each field is classified by
//! pattern instead (see [`predict_form_value_type`]).
//!
//! Known limitation: arrays are described by their first element only.
//! Heterogeneous arrays are not merged into a union schema.

use crate::error::{AppError, AppResult};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Inferred description of a single JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Whole number literal.
    Integer(i64),
    /// Number literal that does not fit an integer.
    Number(f64),
    /// String value.
    String(String),
    /// Boolean value.
    Boolean(bool),
    /// Object with one schema per property.
    Object(BTreeMap<String, SchemaNode>),
    /// Array, described by its first element. Empty arrays carry no item schema.
    Array(Option<Box<SchemaNode>>),
    /// JSON `null`.
    Null,
    /// A value whose inference failed; rendered as an unconstrained schema.
    Unknown,
}

impl SchemaNode {
    /// The OpenAPI type keyword, if the node has one.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            SchemaNode::Integer(_) => Some("integer"),
            SchemaNode::Number(_) => Some("number"),
            SchemaNode::String(_) => Some("string"),
            SchemaNode::Boolean(_) => Some("boolean"),
            SchemaNode::Object(_) => Some("object"),
            SchemaNode::Array(_) => Some("array"),
            SchemaNode::Null | SchemaNode::Unknown => None,
        }
    }

    /// Property schemas of an object node.
    pub fn properties(&self) -> Option<&BTreeMap<String, SchemaNode>> {
        match self {
            SchemaNode::Object(props) => Some(props),
            _ => None,
        }
    }

    /// Renders the node as an OpenAPI schema object.
    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Integer(n) => json!({ "type": "integer", "example": n }),
            SchemaNode::Number(n) => json!({ "type": "number", "example": n }),
            SchemaNode::String(s) => json!({ "type": "string", "example": s }),
            SchemaNode::Boolean(b) => json!({ "type": "boolean", "example": b }),
            SchemaNode::Object(props) => json!({
                "type": "object",
                "properties": properties_value(props),
            }),
            SchemaNode::Array(items) => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("array"));
                if let Some(items) = items {
                    obj.insert("items".to_string(), items.to_value());
                }
                Value::Object(obj)
            }
            SchemaNode::Null => json!({ "example": null }),
            SchemaNode::Unknown => json!({}),
        }
    }
}

impl Display for SchemaNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaNode::Array(Some(inner)) => write!(f, "array<{}>", inner),
            SchemaNode::Null => write!(f, "null"),
            SchemaNode::Unknown => write!(f, "unknown"),
            other => write!(f, "{}", other.type_name().unwrap_or("unknown")),
        }
    }
}

/// Renders property schemas as a JSON object sorted by property name.
pub fn properties_value(props: &BTreeMap<String, SchemaNode>) -> Value {
    Value::Object(
        props
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect(),
    )
}

/// Infers the schema of a decoded JSON value.
///
/// Object properties are inferred independently: a property that fails is
/// logged and recorded as [`SchemaNode::Unknown`] without affecting its siblings.
pub fn infer(value: &Value) -> AppResult<SchemaNode> {
    match value {
        Value::Number(n) => infer_number(&n.to_string()),
        Value::String(s) => Ok(SchemaNode::String(s.clone())),
        Value::Bool(b) => Ok(SchemaNode::Boolean(*b)),
        Value::Null => Ok(SchemaNode::Null),
        Value::Object(map) => Ok(SchemaNode::Object(infer_properties(map))),
        Value::Array(items) => match items.first() {
            Some(first) => Ok(SchemaNode::Array(Some(Box::new(infer(first)?)))),
            None => Ok(SchemaNode::Array(None)),
        },
    }
}

/// Classifies a numeric literal: integer parse first, then floating point.
///
/// `"3"` is an integer and `"3.5"` a number. Anything else is rejected.
pub fn infer_number(literal: &str) -> AppResult<SchemaNode> {
    if let Ok(n) = literal.parse::<i64>() {
        return Ok(SchemaNode::Integer(n));
    }
    if let Ok(n) = literal.parse::<f64>() {
        if n.is_finite() {
            return Ok(SchemaNode::Number(n));
        }
    }
    Err(AppError::UnsupportedValueType(format!(
        "numeric literal '{}'",
        literal
    )))
}

fn infer_properties(map: &Map<String, Value>) -> BTreeMap<String, SchemaNode> {
    map.iter()
        .map(|(key, value)| {
            let node = infer(value).unwrap_or_else(|e| {
                warn!(property = %key, error = %e, "schema inference failed for property");
                SchemaNode::Unknown
            });
            (key.clone(), node)
        })
        .collect()
}

/// Decodes a body as a JSON object.
///
/// Missing, malformed, or non-object payloads yield an empty map.
pub fn infer_json_example(bytes: &[u8]) -> Map<String, Value> {
    if bytes.is_empty() {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!(kind = %json_kind(&other), "body is not a JSON object, skipping inference");
            Map::new()
        }
        Err(e) => {
            debug!(error = %e, "body is not valid JSON, skipping inference");
            Map::new()
        }
    }
}

/// Infers an object schema for a JSON body. Undecodable payloads give an object with no properties.
pub fn infer_body_schema(bytes: &[u8]) -> SchemaNode {
    SchemaNode::Object(infer_properties(&infer_json_example(bytes)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Predicted type of a form field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormValueType {
    /// `true` or `false`.
    Boolean,
    /// Looks like a JSON array literal.
    Array,
    /// Looks like a JSON object literal.
    Object,
    /// Digits, optionally with a fractional part.
    Number,
    /// Anything else.
    String,
}

impl FormValueType {
    /// The OpenAPI type keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormValueType::Boolean => "boolean",
            FormValueType::Array => "array",
            FormValueType::Object => "object",
            FormValueType::Number => "number",
            FormValueType::String => "string",
        }
    }
}

/// Classification rules, checked in order. The first match wins.
fn form_value_rules() -> &'static [(Regex, FormValueType)] {
    static RULES: OnceLock<Vec<(Regex, FormValueType)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"^(true|false)$", FormValueType::Boolean),
            (r"^\[.*\]$", FormValueType::Array),
            (r"^\{.*\}$", FormValueType::Object),
            (r"^[0-9]+$|^[0-9]+\.[0-9]+$", FormValueType::Number),
        ]
        .into_iter()
        .map(|(pattern, kind)| (Regex::new(pattern).expect("Invalid regex constant"), kind))
        .collect()
    })
}

/// Predicts the type of a form field from its text.
pub fn predict_form_value_type(value: &str) -> FormValueType {
    form_value_rules()
        .iter()
        .find(|(re, _)| re.is_match(value))
        .map(|(_, kind)| *kind)
        .unwrap_or(FormValueType::String)
}

/// Decodes a form-encoded body into named fields sorted by name.
///
/// Fields without a name are dropped.
pub fn form_fields(bytes: &[u8]) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = url::form_urlencoded::parse(bytes)
        .into_owned()
        .filter(|(name, _)| !name.is_empty())
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prop<'a>(node: &'a SchemaNode, name: &str) -> &'a SchemaNode {
        &node.properties().expect("object node")[name]
    }

    #[test]
    fn test_integer_and_number() {
        let node = infer(&json!({ "a": 3 })).unwrap();
        assert_eq!(prop(&node, "a"), &SchemaNode::Integer(3));

        let node = infer(&json!({ "a": 3.5 })).unwrap();
        assert_eq!(prop(&node, "a"), &SchemaNode::Number(3.5));
    }

    #[test]
    fn test_number_literal_ordering() {
        assert_eq!(infer_number("3").unwrap(), SchemaNode::Integer(3));
        assert_eq!(infer_number("3.5").unwrap(), SchemaNode::Number(3.5));
        // Beyond i64 falls through to floating point.
        assert!(matches!(
            infer_number("18446744073709551615").unwrap(),
            SchemaNode::Number(_)
        ));
        let err = infer_number("twelve").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedValueType(_)));
    }

    #[test]
    fn test_array_uses_first_element() {
        let node = infer(&json!({ "a": [1, "two", 3.0] })).unwrap();
        assert_eq!(
            prop(&node, "a"),
            &SchemaNode::Array(Some(Box::new(SchemaNode::Integer(1))))
        );

        let node = infer(&json!({ "a": [] })).unwrap();
        assert_eq!(prop(&node, "a"), &SchemaNode::Array(None));
        assert_eq!(prop(&node, "a").to_value(), json!({ "type": "array" }));
    }

    #[test]
    fn test_nested_objects_and_null() {
        let node = infer(&json!({ "user": { "name": "ann", "admin": false, "team": null } })).unwrap();
        let user = prop(&node, "user");
        assert_eq!(prop(user, "name"), &SchemaNode::String("ann".into()));
        assert_eq!(prop(user, "admin"), &SchemaNode::Boolean(false));
        assert_eq!(prop(user, "team"), &SchemaNode::Null);
        assert_eq!(prop(user, "team").to_value(), json!({ "example": null }));
    }

    #[test]
    fn test_inference_is_deterministic() {
        let value = json!({ "b": [ { "x": 1 } ], "a": "s", "c": { "d": 2.25 } });
        let first = infer(&value).unwrap();
        let second = infer(&value).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_value(), second.to_value());
    }

    #[test]
    fn test_rendered_properties_are_sorted() {
        let node = infer_body_schema(br#"{"zeta": 1, "alpha": true}"#);
        let rendered = node.to_value();
        let keys: Vec<&String> = rendered["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
        assert_eq!(rendered["properties"]["zeta"], json!({ "type": "integer", "example": 1 }));
    }

    #[test]
    fn test_malformed_and_non_object_bodies_degrade() {
        assert!(infer_json_example(b"{not json").is_empty());
        assert!(infer_json_example(b"[1, 2]").is_empty());
        assert!(infer_json_example(b"").is_empty());
        assert_eq!(infer_body_schema(b"oops"), SchemaNode::Object(BTreeMap::new()));
    }

    #[test]
    fn test_form_value_priority() {
        let cases = vec![
            ("true", FormValueType::Boolean),
            ("false", FormValueType::Boolean),
            ("[1,2]", FormValueType::Array),
            ("{\"a\":1}", FormValueType::Object),
            ("42", FormValueType::Number),
            ("4.2", FormValueType::Number),
            ("4.", FormValueType::String),
            ("-1", FormValueType::String),
            ("\u{661}\u{662}", FormValueType::String),
            ("True", FormValueType::String),
            ("hello", FormValueType::String),
        ];

        for (input, expected) in cases {
            assert_eq!(predict_form_value_type(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_form_fields_sorted_and_named() {
        let fields = form_fields(b"name=bob&=skip&age=30&tags=%5B1%5D");
        assert_eq!(
            fields,
            vec![
                ("age".to_string(), "30".to_string()),
                ("name".to_string(), "bob".to_string()),
                ("tags".to_string(), "[1]".to_string()),
            ]
        );
    }

    #[test]
    fn test_display() {
        let node = infer(&json!([["x"]])).unwrap();
        assert_eq!(node.to_string(), "array<array<string>>");
    }
}
