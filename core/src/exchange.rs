#![deny(missing_docs)]

//! # Exchange Model
//!
//! The capture unit: one observed request paired with its response, plus the
//! per-capture flags that steer documentation.
//!
//! Bodies are kept verbatim so that schema inference can be re-run on any
//! artifact and yield the same result.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Media type assumed when a payload carries no `Content-Type` header.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Header multimap: name to ordered values, looked up case-insensitively.
///
/// Names are kept sorted so that captured artifacts stay stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, Vec<String>>);

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value. An existing name that differs only in case receives the value.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let existing = self
            .0
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&name))
            .cloned();
        self.0.entry(existing.unwrap_or(name)).or_default().push(value);
    }

    /// Builder form of [`Headers::append`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// All values recorded for `name`, in capture order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// First value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Iterates names and their values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no header was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first non-empty `Content-Type` value, or [`DEFAULT_CONTENT_TYPE`].
    pub fn content_type(&self) -> &str {
        self.get_all("content-type")
            .iter()
            .find(|v| !v.is_empty())
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}

/// Raw payload bytes.
///
/// Serialized as text; bytes that are not valid UTF-8 are replaced when written.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Body(Vec<u8>);

impl Body {
    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True for a zero-length payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payload as text, lossy for non UTF-8 input.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({:?})", self.text())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl Serialize for Body {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text())
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(Self(text.into_bytes()))
    }
}

/// The request half of an exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The concrete path that was requested, without query string.
    #[serde(default)]
    pub path: String,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw request body.
    #[serde(default)]
    pub body: Body,
    /// Path parameter bindings, in template order.
    #[serde(default)]
    pub path_params: IndexMap<String, String>,
    /// Query parameters, each with its values in the order they appeared.
    #[serde(default)]
    pub query: BTreeMap<String, Vec<String>>,
}

/// The response half of an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw response body.
    #[serde(default)]
    pub body: Body,
}

impl Response {
    /// True for the 3xx family, whose bodies are never documented.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Capture-time flags attached to a single exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeOptions {
    /// Label for the request example.
    pub request_name: Option<String>,
    /// Summary shown with the request example.
    pub request_summary: Option<String>,
    /// Description of the response for this status code.
    pub response_description: Option<String>,
    /// Use this exchange's request as the documented example.
    pub use_as_request_example: bool,
    /// Leave this exchange out of the OpenAPI document.
    pub exclude_from_openapi: bool,
    /// Leave this exchange out of the request collection.
    pub exclude_from_postman_collection: bool,
}

impl ExchangeOptions {
    /// Options flagging the exchange as the request example.
    pub fn example() -> Self {
        Self {
            use_as_request_example: true,
            ..Self::default()
        }
    }

    /// Sets the example label.
    pub fn with_request_name(mut self, name: impl Into<String>) -> Self {
        self.request_name = Some(name.into());
        self
    }

    /// Sets the example summary.
    pub fn with_request_summary(mut self, summary: impl Into<String>) -> Self {
        self.request_summary = Some(summary.into());
        self
    }

    /// Sets the per-status response description.
    pub fn with_response_description(mut self, description: impl Into<String>) -> Self {
        self.response_description = Some(description.into());
        self
    }

    /// Excludes the exchange from the OpenAPI document.
    pub fn excluded_from_openapi(mut self) -> Self {
        self.exclude_from_openapi = true;
        self
    }

    /// Excludes the exchange from the request collection.
    pub fn excluded_from_postman_collection(mut self) -> Self {
        self.exclude_from_postman_collection = true;
        self
    }
}

/// One observed request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// The request as received by the handler.
    pub request: Request,
    /// The response the handler produced.
    pub response: Response,
    /// Capture-time flags.
    #[serde(default)]
    pub options: ExchangeOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let headers = Headers::new()
            .with("Content-Type", "application/json")
            .with("content-type", "text/plain");

        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get_all("CONTENT-TYPE"),
            &["application/json".to_string(), "text/plain".to_string()]
        );
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert!(headers.get_all("accept").is_empty());
    }

    #[test]
    fn test_content_type_skips_empty_values() {
        let headers = Headers::new()
            .with("Content-Type", "")
            .with("Content-Type", "application/x-www-form-urlencoded");
        assert_eq!(headers.content_type(), "application/x-www-form-urlencoded");
        assert_eq!(Headers::new().content_type(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_headers_sorted_by_name() {
        let headers: Headers = vec![("X-Trace", "1"), ("Accept", "*/*")].into_iter().collect();
        let names: Vec<&String> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Accept", "X-Trace"]);
    }

    #[test]
    fn test_body_serializes_as_text() {
        let body = Body::from(r#"{"a":1}"#);
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#""{\"a\":1}""#);
        let back: Body = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn test_redirect_range() {
        let res = |status| Response {
            status,
            headers: Headers::new(),
            body: Body::default(),
        };
        assert!(res(301).is_redirect());
        assert!(res(308).is_redirect());
        assert!(!res(200).is_redirect());
        assert!(!res(400).is_redirect());
    }

    #[test]
    fn test_options_default_from_partial_json() {
        let opts: ExchangeOptions =
            serde_json::from_str(r#"{"use_as_request_example": true}"#).unwrap();
        assert!(opts.use_as_request_example);
        assert!(!opts.exclude_from_openapi);
        assert_eq!(opts.request_name, None);
    }
}
