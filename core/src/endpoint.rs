#![deny(missing_docs)]

//! # Endpoints
//!
//! An endpoint is a documented method + path template pair owning the log of
//! exchanges captured against it.
//!
//! Test code creates endpoints up front and shares them between tests. The
//! log is append-only and guarded by a single reader/writer lock, so parallel
//! tests can capture into the same endpoint while readers always see a whole
//! snapshot.

use crate::exchange::{Body, Exchange, ExchangeOptions, Headers, Request, Response};
use crate::path_params::{parse_query, resolve_path_params, split_target};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Status code whose exchange documents the request when none is flagged.
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

/// Everything the interception layer hands over for one handler invocation.
#[derive(Debug, Clone, Default)]
pub struct CapturedExchange {
    /// Request method as received.
    pub method: String,
    /// Request target: the concrete path, optionally followed by `?query`.
    pub target: String,
    /// Request headers.
    pub request_headers: Headers,
    /// Request body bytes.
    pub request_body: Body,
    /// Status code the handler responded with.
    pub status: u16,
    /// Response headers.
    pub response_headers: Headers,
    /// Response body bytes.
    pub response_body: Body,
}

/// A documented endpoint and its captured exchanges.
#[derive(Debug)]
pub struct Endpoint {
    path: String,
    method: String,
    tag: String,
    description: Option<String>,
    summary: Option<String>,
    expected_status: u16,
    exchanges: RwLock<Vec<Exchange>>,
}

impl Endpoint {
    /// Creates an endpoint for `method` on the path template `path` (e.g. `/users/{id}`).
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            tag: String::new(),
            description: None,
            summary: None,
            expected_status: DEFAULT_EXPECTED_STATUS,
            exchanges: RwLock::new(Vec::new()),
        }
    }

    /// Sets the grouping tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Sets the operation description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the operation summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the status code that marks an exchange as a request example candidate.
    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// The path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The HTTP method, as configured.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The grouping tag; empty when untagged.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The operation description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The operation summary.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The status code used for request example selection.
    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }

    /// Appends an exchange to the log.
    pub fn record(&self, exchange: Exchange) {
        // The log is append-only, so a writer that panicked cannot have left it half-updated.
        let mut log = self.exchanges.write().unwrap_or_else(PoisonError::into_inner);
        log.push(exchange);
    }

    /// Builds an exchange from raw captured parts and appends it.
    ///
    /// The query string is decoded and path parameters are resolved against
    /// this endpoint's template.
    pub fn capture(&self, captured: CapturedExchange, options: ExchangeOptions) {
        if !captured.method.eq_ignore_ascii_case(&self.method) {
            warn!(
                endpoint_method = %self.method,
                request_method = %captured.method,
                path = %self.path,
                "captured request method differs from endpoint method"
            );
        }

        let (path, query) = split_target(&captured.target);
        let path_params = resolve_path_params(&self.path, path).into_bindings();
        let query = query.map(parse_query).unwrap_or_default();

        debug!(
            method = %self.method,
            path = %self.path,
            status = captured.status,
            "captured exchange"
        );

        self.record(Exchange {
            request: Request {
                path: path.to_string(),
                headers: captured.request_headers,
                body: captured.request_body,
                path_params,
                query,
            },
            response: Response {
                status: captured.status,
                headers: captured.response_headers,
                body: captured.response_body,
            },
            options,
        });
    }

    /// A consistent copy of the log, in capture order.
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of captured exchanges.
    pub fn len(&self) -> usize {
        self.exchanges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for Endpoint {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            method: self.method.clone(),
            tag: self.tag.clone(),
            description: self.description.clone(),
            summary: self.summary.clone(),
            expected_status: self.expected_status,
            exchanges: RwLock::new(self.exchanges()),
        }
    }
}

/// Serialized shape of an endpoint, as stored in capture artifacts.
#[derive(Serialize)]
struct EndpointRef<'a> {
    path: &'a str,
    method: &'a str,
    tag: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_summary: Option<&'a str>,
    expected_status: u16,
    records: &'a [Exchange],
}

#[derive(Deserialize)]
struct EndpointOwned {
    path: String,
    method: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    api_description: Option<String>,
    #[serde(default)]
    api_summary: Option<String>,
    #[serde(default = "default_expected_status")]
    expected_status: u16,
    #[serde(default)]
    records: Vec<Exchange>,
}

fn default_expected_status() -> u16 {
    DEFAULT_EXPECTED_STATUS
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let log = self.exchanges.read().unwrap_or_else(PoisonError::into_inner);
        EndpointRef {
            path: &self.path,
            method: &self.method,
            tag: &self.tag,
            api_description: self.description.as_deref(),
            api_summary: self.summary.as_deref(),
            expected_status: self.expected_status,
            records: log.as_slice(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = EndpointOwned::deserialize(deserializer)?;
        Ok(Self {
            path: raw.path,
            method: raw.method,
            tag: raw.tag,
            description: raw.api_description,
            summary: raw.api_summary,
            expected_status: raw.expected_status,
            exchanges: RwLock::new(raw.records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn captured(target: &str, status: u16) -> CapturedExchange {
        CapturedExchange {
            method: "GET".into(),
            target: target.into(),
            request_headers: Headers::new().with("Accept", "application/json"),
            status,
            response_body: Body::from(r#"{"ok":true}"#),
            ..CapturedExchange::default()
        }
    }

    #[test]
    fn test_capture_resolves_params_and_query() {
        let endpoint = Endpoint::new("GET", "/users/{id}");
        endpoint.capture(
            captured("/users/42?expand=team&expand=roles", 200),
            ExchangeOptions::example(),
        );

        let log = endpoint.exchanges();
        assert_eq!(log.len(), 1);
        let req = &log[0].request;
        assert_eq!(req.path, "/users/42");
        assert_eq!(req.path_params["id"], "42");
        assert_eq!(req.query["expand"], vec!["team", "roles"]);
        assert!(log[0].options.use_as_request_example);
    }

    #[test]
    fn test_capture_with_mismatched_shape_keeps_exchange() {
        let endpoint = Endpoint::new("GET", "/users/{id}");
        endpoint.capture(captured("/users/42/extra", 200), ExchangeOptions::default());

        let log = endpoint.exchanges();
        assert_eq!(log.len(), 1);
        assert!(log[0].request.path_params.is_empty());
    }

    #[test]
    fn test_concurrent_capture_keeps_every_exchange() {
        let endpoint = Arc::new(Endpoint::new("GET", "/items/{id}"));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let endpoint = Arc::clone(&endpoint);
                thread::spawn(move || {
                    for i in 0..25 {
                        endpoint.capture(
                            captured(&format!("/items/{}", worker * 100 + i), 200),
                            ExchangeOptions::default(),
                        );
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(endpoint.len(), 200);
        assert!(endpoint
            .exchanges()
            .iter()
            .all(|ex| ex.request.path_params.contains_key("id")));
    }

    #[test]
    fn test_serde_round_trip_preserves_metadata() {
        let endpoint = Endpoint::new("POST", "/users")
            .with_tag("Users")
            .with_summary("Create user")
            .with_expected_status(201);
        endpoint.capture(captured("/users", 201), ExchangeOptions::example());

        let json = serde_json::to_string(&endpoint).unwrap();
        let back: Endpoint = serde_json::from_str(&json).unwrap();

        assert_eq!(back.path(), "/users");
        assert_eq!(back.tag(), "Users");
        assert_eq!(back.summary(), Some("Create user"));
        assert_eq!(back.description(), None);
        assert_eq!(back.expected_status(), 201);
        assert_eq!(back.exchanges(), endpoint.exchanges());
    }

    #[test]
    fn test_deserialize_minimal_artifact() {
        let back: Endpoint =
            serde_json::from_str(r#"{"path": "/ping", "method": "get"}"#).unwrap();
        assert_eq!(back.expected_status(), DEFAULT_EXPECTED_STATUS);
        assert!(back.is_empty());
        assert_eq!(back.tag(), "");
    }
}
