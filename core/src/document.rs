#![deny(missing_docs)]

//! # Document Synthesis
//!
//! Merges per-endpoint fragments into the path -> method -> fragment
//! structure that the exporters render.
//!
//! Input order is the artifact discovery order and it matters: when the same
//! path and method arrive twice, the later fragment replaces the earlier one
//! wholesale. Sibling methods on the same path are left untouched.

use crate::aggregator::Fragment;
use crate::endpoint::Endpoint;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// The merged documentation of every endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    paths: BTreeMap<String, BTreeMap<String, Fragment>>,
}

impl Document {
    /// Path templates mapped to lowercase methods mapped to fragments.
    pub fn paths(&self) -> &BTreeMap<String, BTreeMap<String, Fragment>> {
        &self.paths
    }

    /// Looks up the fragment for `path` and `method` (case-insensitive method).
    pub fn get(&self, path: &str, method: &str) -> Option<&Fragment> {
        self.paths
            .get(path)
            .and_then(|methods| methods.get(&method.to_ascii_lowercase()))
    }

    /// True when no endpoint was merged.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Renders the `paths` object.
    pub fn to_paths_value(&self) -> Value {
        let paths: Map<String, Value> = self
            .paths
            .iter()
            .map(|(path, methods)| {
                let ops: Map<String, Value> = methods
                    .iter()
                    .map(|(method, fragment)| (method.clone(), fragment.to_value()))
                    .collect();
                (path.clone(), Value::Object(ops))
            })
            .collect();
        Value::Object(paths)
    }

    fn insert(&mut self, path: String, method: &str, fragment: Fragment) {
        let method = method.to_ascii_lowercase();
        let methods = self.paths.entry(path).or_default();
        if methods.insert(method.clone(), fragment).is_some() {
            debug!(method = %method, "fragment replaced by a later artifact");
        }
    }
}

/// Merges `(path, method, fragment)` triples, in the order given, into a new document.
pub fn synthesize<I, P, M>(fragments: I) -> Document
where
    I: IntoIterator<Item = (P, M, Fragment)>,
    P: Into<String>,
    M: AsRef<str>,
{
    let mut document = Document::default();
    for (path, method, fragment) in fragments {
        document.insert(path.into(), method.as_ref(), fragment);
    }
    document
}

/// Builds each endpoint's fragment and merges them in iteration order.
pub fn synthesize_endpoints<'a, I>(endpoints: I) -> Document
where
    I: IntoIterator<Item = &'a Endpoint>,
{
    synthesize(
        endpoints
            .into_iter()
            .map(|ep| (ep.path().to_string(), ep.method().to_string(), ep.fragment())),
    )
}
