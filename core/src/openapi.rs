#![deny(missing_docs)]

//! # OpenAPI Export
//!
//! Renders a [`Document`] with configured front matter into an OpenAPI 3.0
//! document. Nothing in the front matter is inferred.

use crate::document::Document;
use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// OpenAPI version written to generated documents.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// The `info` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiInfo {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self {
            title: "Autodoc".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Static front matter merged into every generated document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// The `info` block.
    pub info: OpenApiInfo,
    /// Raw `components` object.
    pub components: Map<String, Value>,
    /// Top-level security requirements.
    pub security: Vec<Map<String, Value>>,
    /// Server entries (`url`, `description`, ...).
    pub servers: Vec<BTreeMap<String, String>>,
}

/// Renders the OpenAPI document.
pub fn render_openapi(document: &Document, config: &OpenApiConfig) -> Value {
    let mut doc = Map::new();
    doc.insert("openapi".to_string(), json!(OPENAPI_VERSION));
    doc.insert(
        "info".to_string(),
        json!({ "title": config.info.title, "version": config.info.version }),
    );
    if !config.servers.is_empty() {
        doc.insert("servers".to_string(), json!(config.servers));
    }
    if !config.security.is_empty() {
        doc.insert("security".to_string(), json!(config.security));
    }
    if !config.components.is_empty() {
        doc.insert(
            "components".to_string(),
            Value::Object(config.components.clone()),
        );
    }
    doc.insert("paths".to_string(), document.to_paths_value());
    Value::Object(doc)
}

/// Serializes a rendered document as YAML.
pub fn to_yaml(value: &Value) -> AppResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Serializes a rendered document as pretty-printed JSON.
pub fn to_json(value: &Value) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
