#![deny(missing_docs)]

//! # Path Parameter Resolution
//!
//! Recovers `{name}` bindings by walking an endpoint's path template against
//! the concrete path a test requested, and decodes query strings.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::warn;

/// Outcome of matching a template against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// Segment counts matched. Holds the placeholders whose value differed from the template.
    Bound(IndexMap<String, String>),
    /// Segment counts differed; no bindings were extracted.
    Skipped {
        /// Segments in the template.
        template_segments: usize,
        /// Segments in the concrete path.
        path_segments: usize,
    },
}

impl PathResolution {
    /// The bindings, empty when resolution was skipped.
    pub fn into_bindings(self) -> IndexMap<String, String> {
        match self {
            PathResolution::Bound(bindings) => bindings,
            PathResolution::Skipped { .. } => IndexMap::new(),
        }
    }
}

/// Returns the parameter name when `segment` is a `{name}` placeholder.
pub fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .map(str::trim)
}

/// Resolves path parameters of `template` from `concrete_path`.
///
/// e.g. `/users/{id}` against `/users/42` -> `{id: "42"}`
///
/// A query string on `concrete_path` is ignored. When the segment counts
/// differ nothing is bound and a warning is logged.
pub fn resolve_path_params(template: &str, concrete_path: &str) -> PathResolution {
    let (path, _) = split_target(concrete_path);
    let template_segments: Vec<&str> = template.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();

    if template_segments.len() != path_segments.len() {
        warn!(
            template,
            path, "request path does not match endpoint path, skipping path parameters"
        );
        return PathResolution::Skipped {
            template_segments: template_segments.len(),
            path_segments: path_segments.len(),
        };
    }

    let bindings = template_segments
        .iter()
        .zip(path_segments.iter())
        .filter(|(tpl, concrete)| tpl != concrete)
        .filter_map(|(tpl, concrete)| {
            placeholder_name(tpl).map(|name| (name.to_string(), concrete.to_string()))
        })
        .collect();

    PathResolution::Bound(bindings)
}

/// Splits a request target into path and optional raw query.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Decodes a raw query string. Every key keeps all of its values in order.
pub fn parse_query(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()).into_owned() {
        params.entry(key).or_default().push(value);
    }
    params
}

/// Encodes query parameters back into a query string, keys in sorted order.
pub fn encode_query(query: &BTreeMap<String, Vec<String>>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, values) in query {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}
