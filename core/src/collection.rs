#![deny(missing_docs)]

//! # Request Collection Export
//!
//! Builds a Postman v2.1 collection: one folder per tag, one runnable request
//! per endpoint.
//!
//! Unlike the OpenAPI export, every endpoint must carry an exchange flagged as
//! the request example. An endpoint without one fails the whole export. An
//! endpoint whose flagged examples are all excluded from the collection is
//! simply left out.

use crate::endpoint::Endpoint;
use crate::error::{AppError, AppResult};
use crate::exchange::Exchange;
use crate::path_params::encode_query;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Schema URL of the emitted collection format.
pub const POSTMAN_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Folder receiving endpoints without a tag.
pub const UNTAGGED_FOLDER: &str = "untagged";

/// Collection naming and URL settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Collection display name.
    pub name: String,
    /// Scheme and host prefixed to every request path.
    pub base_url: String,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            name: "Autodoc".to_string(),
            base_url: "http://localhost".to_string(),
        }
    }
}

/// A request collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection metadata.
    pub info: CollectionInfo,
    /// Folders, one per tag.
    pub item: Vec<Folder>,
}

/// Collection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Display name.
    pub name: String,
    /// Format schema URL.
    pub schema: String,
}

/// A folder of requests sharing a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder name (the tag).
    pub name: String,
    /// Requests in discovery order.
    pub item: Vec<Item>,
}

/// A single request entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name, `[METHOD] /path`.
    pub name: String,
    /// The request to send.
    pub request: ItemRequest,
}

/// Request details of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Request headers, one entry per value.
    pub header: Vec<KeyValue>,
    /// Raw body, omitted when the example had none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RawBody>,
    /// Target URL.
    pub url: ItemUrl,
    /// Endpoint description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A key/value pair (header or query parameter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Name.
    pub key: String,
    /// Value.
    pub value: String,
}

/// A raw request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBody {
    /// Body mode; always `raw`.
    pub mode: String,
    /// Body text.
    pub raw: String,
    /// Editor language hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RawBodyOptions>,
}

/// Options of a raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBodyOptions {
    /// Raw body settings.
    pub raw: RawLanguage,
}

/// Language of a raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLanguage {
    /// Language name, e.g. `json`.
    pub language: String,
}

/// A request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUrl {
    /// Full URL including query.
    pub raw: String,
    /// Query parameters, one entry per value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<KeyValue>,
}

/// The first exchange flagged as request example and not excluded from the collection.
pub fn collection_example(exchanges: &[Exchange]) -> Option<&Exchange> {
    exchanges.iter().find(|ex| {
        ex.options.use_as_request_example && !ex.options.exclude_from_postman_collection
    })
}

/// Builds the item of one endpoint. `None` when every flagged example is excluded from the collection.
fn build_item(endpoint: &Endpoint, options: &CollectionOptions) -> AppResult<Option<Item>> {
    let exchanges = endpoint.exchanges();
    if !exchanges.iter().any(|ex| ex.options.use_as_request_example) {
        return Err(AppError::NoExampleFound {
            method: endpoint.method().to_uppercase(),
            path: endpoint.path().to_string(),
        });
    }
    let Some(example) = collection_example(&exchanges) else {
        debug!(
            method = %endpoint.method(),
            path = %endpoint.path(),
            "every request example is excluded from the collection, skipping endpoint"
        );
        return Ok(None);
    };
    let req = &example.request;

    let header = req
        .headers
        .iter()
        .flat_map(|(name, values)| {
            values.iter().map(move |value| KeyValue {
                key: name.clone(),
                value: value.clone(),
            })
        })
        .collect();

    let query = req
        .query
        .iter()
        .flat_map(|(name, values)| {
            values.iter().map(move |value| KeyValue {
                key: name.clone(),
                value: value.clone(),
            })
        })
        .collect();

    let path = if req.path.is_empty() {
        endpoint.path()
    } else {
        req.path.as_str()
    };
    let mut raw_url = format!("{}{}", options.base_url.trim_end_matches('/'), path);
    if !req.query.is_empty() {
        raw_url.push('?');
        raw_url.push_str(&encode_query(&req.query));
    }

    let body = (!req.body.is_empty()).then(|| {
        let is_json = req.headers.content_type().to_ascii_lowercase().contains("json");
        RawBody {
            mode: "raw".to_string(),
            raw: req.body.text().into_owned(),
            options: is_json.then(|| RawBodyOptions {
                raw: RawLanguage {
                    language: "json".to_string(),
                },
            }),
        }
    });

    Ok(Some(Item {
        name: format!("[{}] {}", endpoint.method().to_uppercase(), endpoint.path()),
        request: ItemRequest {
            method: endpoint.method().to_uppercase(),
            header,
            body,
            url: ItemUrl {
                raw: raw_url,
                query,
            },
            description: endpoint.description().map(str::to_string),
        },
    }))
}

/// Builds the collection, grouping endpoints by tag in discovery order.
///
/// Fails with [`AppError::NoExampleFound`] on the first endpoint lacking a flagged example.
/// Endpoints whose flagged examples are all excluded from the collection are left out.
pub fn build_collection<'a, I>(endpoints: I, options: &CollectionOptions) -> AppResult<Collection>
where
    I: IntoIterator<Item = &'a Endpoint>,
{
    let mut folders: BTreeMap<String, Vec<Item>> = BTreeMap::new();
    for endpoint in endpoints {
        let folder = if endpoint.tag().is_empty() {
            UNTAGGED_FOLDER
        } else {
            endpoint.tag()
        };
        if let Some(item) = build_item(endpoint, options)? {
            folders.entry(folder.to_string()).or_default().push(item);
        }
    }

    Ok(Collection {
        info: CollectionInfo {
            name: options.name.clone(),
            schema: POSTMAN_SCHEMA.to_string(),
        },
        item: folders
            .into_iter()
            .map(|(name, item)| Folder { name, item })
            .collect(),
    })
}

/// Serializes a collection as pretty-printed JSON.
pub fn collection_to_json(collection: &Collection) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::CapturedExchange;
    use crate::exchange::{Body, ExchangeOptions, Headers};

    fn capture(endpoint: &Endpoint, target: &str, options: ExchangeOptions) {
        endpoint.capture(
            CapturedExchange {
                method: endpoint.method().to_string(),
                target: target.to_string(),
                request_headers: Headers::new().with("Content-Type", "application/json"),
                request_body: Body::from(r#"{"name":"bob"}"#),
                status: 200,
                ..CapturedExchange::default()
            },
            options,
        );
    }

    #[test]
    fn test_groups_by_tag_with_untagged_bucket() {
        let users = Endpoint::new("post", "/users").with_tag("Users");
        capture(&users, "/users", ExchangeOptions::example());
        let health = Endpoint::new("get", "/health");
        capture(&health, "/health", ExchangeOptions::example());

        let collection =
            build_collection([&users, &health], &CollectionOptions::default()).unwrap();

        let names: Vec<&str> = collection.item.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Users", "untagged"]);
        assert_eq!(collection.info.schema, POSTMAN_SCHEMA);

        let item = &collection.item[0].item[0];
        assert_eq!(item.name, "[POST] /users");
        assert_eq!(item.request.method, "POST");
        let body = item.request.body.as_ref().unwrap();
        assert_eq!(body.raw, r#"{"name":"bob"}"#);
        assert_eq!(body.options.as_ref().unwrap().raw.language, "json");
    }

    #[test]
    fn test_missing_example_is_an_error() {
        let endpoint = Endpoint::new("GET", "/users/{id}");
        capture(&endpoint, "/users/1", ExchangeOptions::default());

        let err = build_collection([&endpoint], &CollectionOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::NoExampleFound { .. }));
        assert_eq!(format!("{}", err), "No request example found for [GET] /users/{id}");
    }

    #[test]
    fn test_excluded_example_is_skipped() {
        let endpoint = Endpoint::new("GET", "/items");
        capture(
            &endpoint,
            "/items?page=1",
            ExchangeOptions::example().excluded_from_postman_collection(),
        );
        capture(&endpoint, "/items?page=2", ExchangeOptions::example());

        let collection =
            build_collection([&endpoint], &CollectionOptions::default()).unwrap();
        let url = &collection.item[0].item[0].request.url;
        assert_eq!(url.raw, "http://localhost/items?page=2");
        assert_eq!(
            url.query,
            vec![KeyValue {
                key: "page".into(),
                value: "2".into()
            }]
        );
    }

    #[test]
    fn test_fully_excluded_endpoint_is_left_out() {
        let hidden = Endpoint::new("GET", "/internal").with_tag("Ops");
        capture(
            &hidden,
            "/internal",
            ExchangeOptions::example().excluded_from_postman_collection(),
        );
        let users = Endpoint::new("GET", "/users").with_tag("Users");
        capture(&users, "/users", ExchangeOptions::example());

        let collection =
            build_collection([&hidden, &users], &CollectionOptions::default()).unwrap();
        let names: Vec<&str> = collection.item.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Users"]);
        assert_eq!(collection.item[0].item[0].name, "[GET] /users");

        let only_hidden = build_collection([&hidden], &CollectionOptions::default()).unwrap();
        assert!(only_hidden.item.is_empty());
    }

    #[test]
    fn test_first_flagged_example_is_used() {
        let endpoint = Endpoint::new("GET", "/items/{id}");
        capture(&endpoint, "/items/1", ExchangeOptions::example());
        capture(&endpoint, "/items/2", ExchangeOptions::example());

        let options = CollectionOptions {
            name: "Shop".into(),
            base_url: "https://api.example.com/".into(),
        };
        let collection = build_collection([&endpoint], &options).unwrap();
        assert_eq!(collection.info.name, "Shop");
        assert_eq!(
            collection.item[0].item[0].request.url.raw,
            "https://api.example.com/items/1"
        );
    }

    #[test]
    fn test_json_shape() {
        let endpoint = Endpoint::new("GET", "/ping");
        endpoint.record(Exchange {
            request: Default::default(),
            response: crate::exchange::Response {
                status: 204,
                headers: Headers::new(),
                body: Body::default(),
            },
            options: ExchangeOptions::example(),
        });

        let collection =
            build_collection([&endpoint], &CollectionOptions::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&collection_to_json(&collection).unwrap()).unwrap();
        let request = &value["item"][0]["item"][0]["request"];
        assert_eq!(request["url"]["raw"], "http://localhost/ping");
        assert!(request.get("body").is_none());
        assert!(request["url"].get("query").is_none());
    }
}
