#![deny(missing_docs)]

//! # Capture Artifacts
//!
//! Each test process writes its endpoints as JSON files named
//! `autodoc/autodoc-{METHOD}-{path}.json`; the aggregation step later reads
//! them back.

use crate::endpoint::Endpoint;
use crate::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name that holds capture artifacts.
pub const ARTIFACT_DIR: &str = "autodoc";

/// File name prefix of capture artifacts.
pub const ARTIFACT_PREFIX: &str = "autodoc-";

/// Derives the artifact file name for an endpoint.
///
/// e.g. `GET /users/{id}` -> `autodoc-GET-users_{id}.json`
pub fn artifact_file_name(method: &str, path: &str) -> String {
    let flat = path.replace('/', "_");
    format!(
        "{}{}-{}.json",
        ARTIFACT_PREFIX,
        method.to_uppercase(),
        flat.trim_start_matches('_')
    )
}

/// True when `path` names a capture artifact inside an `autodoc` directory.
pub fn is_artifact_path(path: &Path) -> bool {
    let in_artifact_dir = path
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == ARTIFACT_DIR);
    let has_prefix = path
        .file_name()
        .and_then(|f| f.to_str())
        .is_some_and(|f| f.starts_with(ARTIFACT_PREFIX));
    in_artifact_dir && has_prefix
}

impl Endpoint {
    /// Serializes the endpoint as an artifact document.
    pub fn to_artifact_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Writes the endpoint into `dir`, creating it if needed. Returns the written file.
    pub fn write_artifact(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let file = dir.join(artifact_file_name(self.method(), self.path()));
        fs::write(&file, self.to_artifact_json()?)?;
        Ok(file)
    }
}

/// Reads one artifact back into an endpoint.
pub fn read_artifact(path: &Path) -> AppResult<Endpoint> {
    let failure = |reason: String| AppError::ArtifactRead {
        path: path.display().to_string(),
        reason,
    };
    let content = fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| failure(e.to_string()))
}
