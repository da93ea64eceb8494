#![deny(missing_docs)]

//! # Autodoc Core
//!
//! Derives API documentation from HTTP exchanges captured while tests exercise
//! an application's handlers.
//!
//! Tests record exchanges into [`Endpoint`]s and write them out as capture
//! artifacts. The aggregation step reads every artifact, folds each endpoint
//! into a [`Fragment`], merges the fragments into a [`Document`] and exports
//! it as OpenAPI and as a request collection.

/// Shared error types.
pub mod error;

/// Captured request/response pairs.
pub mod exchange;

/// Endpoints and their exchange logs.
pub mod endpoint;

/// Schema inference for JSON and form payloads.
pub mod inference;

/// Path template and query string resolution.
pub mod path_params;

/// Per-endpoint documentation fragments.
pub mod aggregator;

/// Merging fragments into one document.
pub mod document;

/// OpenAPI rendering.
pub mod openapi;

/// Request collection rendering.
pub mod collection;

/// Capture artifact files.
pub mod artifact;

pub use aggregator::{build_fragment, select_canonical, Fragment, ParamLocation, Parameter};
pub use artifact::{artifact_file_name, is_artifact_path, read_artifact};
pub use collection::{build_collection, Collection, CollectionOptions};
pub use document::{synthesize, synthesize_endpoints, Document};
pub use endpoint::{CapturedExchange, Endpoint};
pub use error::{AppError, AppResult};
pub use exchange::{Body, Exchange, ExchangeOptions, Headers, Request, Response};
pub use inference::{infer, infer_json_example, predict_form_value_type, FormValueType, SchemaNode};
pub use openapi::{render_openapi, OpenApiConfig, OpenApiInfo};
pub use path_params::{resolve_path_params, PathResolution};
