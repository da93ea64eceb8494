#![deny(missing_docs)]

//! # Endpoint Aggregation
//!
//! Folds an endpoint's exchange log into one documentation fragment:
//! parameters and request body from the canonical example exchange, and one
//! response entry per observed status code.
//!
//! Known lossy behaviour: when several exchanges share a status code, the one
//! captured last is the only one documented for that code.

use crate::endpoint::Endpoint;
use crate::exchange::{Exchange, Headers};
use crate::inference::{form_fields, infer_body_schema, infer_json_example, predict_form_value_type};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Templated path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => write!(f, "path"),
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Header => write!(f, "header"),
        }
    }
}

/// A documented operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter location.
    pub location: ParamLocation,
    /// Parameter name.
    pub name: String,
    /// Whether the parameter is required.
    pub required: bool,
    /// Schema of the parameter value.
    pub schema: Value,
    /// Observed value.
    pub example: Value,
}

impl Parameter {
    /// Renders the OpenAPI parameter object.
    pub fn to_value(&self) -> Value {
        json!({
            "in": self.location.to_string(),
            "name": self.name,
            "required": self.required,
            "schema": self.schema,
            "example": self.example,
        })
    }
}

/// A named request example.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaExample {
    /// Example summary.
    pub summary: Option<String>,
    /// Example payload.
    pub value: Value,
}

/// Schema and examples documented for one media type.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaContent {
    /// Payload schema.
    pub schema: Value,
    /// Examples keyed by display name.
    pub examples: IndexMap<String, MediaExample>,
}

impl MediaContent {
    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("schema".to_string(), self.schema.clone());
        if !self.examples.is_empty() {
            let examples = self
                .examples
                .iter()
                .map(|(name, ex)| {
                    let mut ex_obj = Map::new();
                    if let Some(summary) = &ex.summary {
                        ex_obj.insert("summary".to_string(), json!(summary));
                    }
                    ex_obj.insert("value".to_string(), ex.value.clone());
                    (name.clone(), Value::Object(ex_obj))
                })
                .collect();
            obj.insert("examples".to_string(), Value::Object(examples));
        }
        Value::Object(obj)
    }
}

/// One documented response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDoc {
    /// Response description.
    pub description: String,
    /// Body schema keyed by content type. `None` for redirects.
    pub content: Option<BTreeMap<String, Value>>,
}

impl ResponseDoc {
    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("description".to_string(), json!(self.description));
        if let Some(content) = &self.content {
            let media = content
                .iter()
                .map(|(ct, schema)| (ct.clone(), json!({ "schema": schema })))
                .collect();
            obj.insert("content".to_string(), Value::Object(media));
        }
        Value::Object(obj)
    }
}

/// The documentation of one endpoint, ready to be placed under `paths`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// Operation tags.
    pub tags: Vec<String>,
    /// Operation description.
    pub description: String,
    /// Operation summary.
    pub summary: String,
    /// Parameters of the canonical example request.
    pub parameters: Vec<Parameter>,
    /// Request body by content type; empty when no exchange qualified as example.
    pub request_body: BTreeMap<String, MediaContent>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, ResponseDoc>,
}

impl Fragment {
    /// Renders the OpenAPI operation object.
    pub fn to_value(&self) -> Value {
        let mut op = Map::new();
        op.insert("tags".to_string(), json!(self.tags));
        op.insert("description".to_string(), json!(self.description));
        op.insert("summary".to_string(), json!(self.summary));

        let content: Map<String, Value> = self
            .request_body
            .iter()
            .map(|(ct, media)| (ct.clone(), media.to_value()))
            .collect();
        op.insert("requestBody".to_string(), json!({ "content": content }));

        op.insert(
            "parameters".to_string(),
            Value::Array(self.parameters.iter().map(Parameter::to_value).collect()),
        );

        let responses: Map<String, Value> = self
            .responses
            .iter()
            .map(|(status, res)| (status.clone(), res.to_value()))
            .collect();
        op.insert("responses".to_string(), Value::Object(responses));

        Value::Object(op)
    }
}

/// Picks the exchange whose request documents the endpoint.
///
/// Scans in capture order, skipping exchanges excluded from the document.
/// An exchange flagged as the request example is always taken, and once one
/// is taken plain status matches no longer apply. Until then, an exchange
/// whose status equals `expected_status` is taken. Later candidates replace
/// earlier ones.
pub fn select_canonical(exchanges: &[Exchange], expected_status: u16) -> Option<&Exchange> {
    let mut chosen = None;
    let mut flagged = false;

    for exchange in exchanges.iter().filter(|ex| !ex.options.exclude_from_openapi) {
        if exchange.options.use_as_request_example {
            chosen = Some(exchange);
            flagged = true;
        } else if !flagged && exchange.response.status == expected_status {
            chosen = Some(exchange);
        }
    }

    chosen
}

/// Builds the parameter list of a request: path, then query, then headers.
pub fn collect_parameters(exchange: &Exchange) -> Vec<Parameter> {
    let req = &exchange.request;
    let mut params = Vec::new();

    for (name, value) in &req.path_params {
        params.push(Parameter {
            location: ParamLocation::Path,
            name: name.clone(),
            required: true,
            schema: json!({ "type": "string" }),
            example: json!(value),
        });
    }

    for (name, values) in &req.query {
        let (schema, example) = match values.as_slice() {
            [single] => (json!({ "type": "string" }), json!(single)),
            [] => (json!({ "type": "string" }), json!("")),
            many => (
                json!({ "type": "array", "items": { "type": "string" } }),
                json!(many),
            ),
        };
        params.push(Parameter {
            location: ParamLocation::Query,
            name: name.clone(),
            required: false,
            schema,
            example,
        });
    }

    params.extend(header_parameters(&req.headers));
    params
}

fn header_parameters(headers: &Headers) -> impl Iterator<Item = Parameter> + '_ {
    headers.iter().map(|(name, values)| Parameter {
        location: ParamLocation::Header,
        name: name.clone(),
        required: true,
        schema: json!({ "type": "string" }),
        example: json!(values.join(", ")),
    })
}

/// Media-type essence: lowercased, parameters stripped.
fn media_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Documents one exchange's request body under its content type.
///
/// The example is named `"{index}. {request name}"`, or `"{index}. Example"`
/// when the exchange has no request name. Returns `None` for an empty body.
pub fn request_media(exchange: &Exchange, index: usize) -> Option<(String, MediaContent)> {
    let req = &exchange.request;
    if req.body.is_empty() {
        return None;
    }

    let opts = &exchange.options;
    let example_name = match opts.request_name.as_deref() {
        Some(name) if !name.is_empty() => format!("{}. {}", index, name),
        _ => format!("{}. Example", index),
    };
    let example = |value: Value| {
        let mut examples = IndexMap::new();
        examples.insert(
            example_name.clone(),
            MediaExample {
                summary: opts.request_summary.clone(),
                value,
            },
        );
        examples
    };

    let content_type = req.headers.content_type();
    let media = match media_essence(content_type).as_str() {
        "application/json" => MediaContent {
            schema: infer_body_schema(req.body.as_bytes()).to_value(),
            examples: example(Value::Object(infer_json_example(req.body.as_bytes()))),
        },
        "application/x-www-form-urlencoded" => {
            let fields = form_fields(req.body.as_bytes());
            let properties: Map<String, Value> = fields
                .iter()
                .map(|(name, value)| {
                    (
                        name.clone(),
                        json!({
                            "type": predict_form_value_type(value).as_str(),
                            "example": value,
                        }),
                    )
                })
                .collect();
            let raw = fields
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("&");
            MediaContent {
                schema: json!({ "type": "object", "properties": properties }),
                examples: example(json!(raw)),
            }
        }
        "text/plain" => MediaContent {
            schema: json!({ "type": "object" }),
            examples: example(json!(req.body.text())),
        },
        other => {
            debug!(content_type = other, "request body media type is not inferred");
            MediaContent {
                schema: json!({ "type": "object" }),
                examples: IndexMap::new(),
            }
        }
    };

    Some((content_type.to_string(), media))
}

/// Documents the request body of an endpoint.
///
/// When the canonical exchange is a flagged example, every flagged exchange
/// not excluded from the document contributes a numbered example, counted in
/// capture order. Per content type the schema comes from the last of them,
/// which is the canonical one. A canonical exchange picked by status alone is
/// documented on its own as example `1`.
pub fn build_request_body(
    exchanges: &[Exchange],
    canonical: &Exchange,
) -> BTreeMap<String, MediaContent> {
    let mut content: BTreeMap<String, MediaContent> = BTreeMap::new();

    if !canonical.options.use_as_request_example {
        content.extend(request_media(canonical, 1));
        return content;
    }

    let flagged = exchanges
        .iter()
        .filter(|ex| !ex.options.exclude_from_openapi && ex.options.use_as_request_example);
    for (i, exchange) in flagged.enumerate() {
        let Some((content_type, media)) = request_media(exchange, i + 1) else {
            continue;
        };
        match content.get_mut(&content_type) {
            Some(existing) => {
                existing.schema = media.schema;
                existing.examples.extend(media.examples);
            }
            None => {
                content.insert(content_type, media);
            }
        }
    }
    content
}

/// Documents one exchange's response.
pub fn build_response(exchange: &Exchange) -> ResponseDoc {
    let res = &exchange.response;
    let description = exchange
        .options
        .response_description
        .clone()
        .unwrap_or_default();

    if res.is_redirect() {
        return ResponseDoc {
            description,
            content: None,
        };
    }

    let mut content = BTreeMap::new();
    content.insert(
        res.headers.content_type().to_string(),
        infer_body_schema(res.body.as_bytes()).to_value(),
    );
    ResponseDoc {
        description,
        content: Some(content),
    }
}

/// Builds the fragment for an exchange log.
pub fn build_fragment(
    exchanges: &[Exchange],
    expected_status: u16,
    tag: &str,
    description: Option<&str>,
    summary: Option<&str>,
) -> Fragment {
    let mut fragment = Fragment {
        tags: if tag.is_empty() {
            Vec::new()
        } else {
            vec![tag.to_string()]
        },
        description: description.unwrap_or_default().to_string(),
        summary: summary.unwrap_or_default().to_string(),
        ..Fragment::default()
    };

    if let Some(canonical) = select_canonical(exchanges, expected_status) {
        fragment.parameters = collect_parameters(canonical);
        fragment.request_body = build_request_body(exchanges, canonical);
    } else {
        debug!("no exchange qualifies as request example, request body left empty");
    }

    for exchange in exchanges.iter().filter(|ex| !ex.options.exclude_from_openapi) {
        fragment.responses.insert(
            exchange.response.status.to_string(),
            build_response(exchange),
        );
    }

    fragment
}

impl Endpoint {
    /// Builds this endpoint's fragment from a snapshot of its log.
    pub fn fragment(&self) -> Fragment {
        build_fragment(
            &self.exchanges(),
            self.expected_status(),
            self.tag(),
            self.description(),
            self.summary(),
        )
    }
}
