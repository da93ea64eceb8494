#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only conditions that must reach the caller live here. Malformed bodies,
//! path shape mismatches and a missing OpenAPI request example degrade
//! locally and are reported through `tracing` instead.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// JSON encoding or decoding failure.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// YAML encoding or decoding failure.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// A decoded value fell outside the JSON value universe the inference engine supports.
    #[from(ignore)]
    #[display("Unsupported value type: {_0}")]
    UnsupportedValueType(String),

    /// The request-collection exporter found no exchange flagged as the request example.
    #[from(ignore)]
    #[display("No request example found for [{method}] {path}")]
    NoExampleFound {
        /// HTTP method of the endpoint.
        method: String,
        /// Path template of the endpoint.
        path: String,
    },

    /// A capture artifact could not be read or decoded.
    #[from(ignore)]
    #[display("Failed to read artifact {path}: {reason}")]
    ArtifactRead {
        /// Location of the artifact.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
