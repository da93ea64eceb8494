#![deny(missing_docs)]

//! # Generate Command
//!
//! Collects every capture artifact under a root directory, merges them into
//! one document and writes the enabled exports.
//!
//! Artifacts are read in file-name order so that later files win collisions
//! deterministically. All artifacts are read before anything is written: one
//! unreadable artifact aborts the run with no output. A missing request
//! example only fails the collection export.

use crate::config::{Config, OpenApiFileType, DEFAULT_CONFIG_PATH};
use autodoc_core::collection::collection_to_json;
use autodoc_core::openapi::{to_json, to_yaml};
use autodoc_core::{
    build_collection, is_artifact_path, read_artifact, render_openapi, synthesize_endpoints,
    AppError, AppResult, Endpoint,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File name of the request collection export.
pub const COLLECTION_FILE: &str = "postman_collection.json";

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Directory scanned for `autodoc/autodoc-*.json` artifacts.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file; created with defaults when missing.
    #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Artifact files under `root`, in lexicographic file-name order.
///
/// A directory entry that cannot be read fails the scan.
pub fn discover_artifacts(root: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| AppError::ArtifactRead {
            path: e.path().unwrap_or(root).display().to_string(),
            reason: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_artifact_path(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Reads every artifact, failing on the first that cannot be read.
pub fn load_endpoints(files: &[PathBuf]) -> AppResult<Vec<Endpoint>> {
    files
        .iter()
        .map(|file| {
            debug!(file = %file.display(), "reading artifact");
            read_artifact(file)
        })
        .collect()
}

fn write_output(output_dir: &Path, name: &str, content: String) -> AppResult<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(name);
    fs::write(&path, content)?;
    info!(path = %path.display(), "wrote");
    Ok(path)
}

/// Runs the pipeline with a loaded config. Returns the written files.
///
/// Nothing is written unless every artifact was read. The OpenAPI document
/// is written before the collection is built, so an endpoint without a
/// request example fails only the collection.
pub fn run(root: &Path, config: &Config) -> AppResult<Vec<PathBuf>> {
    let files = discover_artifacts(root)?;
    info!(count = files.len(), root = %root.display(), "found capture artifacts");

    let endpoints = load_endpoints(&files)?;
    let output_dir = root.join(&config.output_dir);
    let mut written = Vec::new();

    if config.generate_openapi {
        let document = synthesize_endpoints(&endpoints);
        let openapi = render_openapi(&document, &config.openapi_config);
        let content = match config.openapi_file_type {
            OpenApiFileType::Yaml => to_yaml(&openapi)?,
            OpenApiFileType::Json => to_json(&openapi)?,
        };
        written.push(write_output(
            &output_dir,
            config.openapi_file_type.file_name(),
            content,
        )?);
    }

    if config.generate_postman_collection {
        let collection = build_collection(&endpoints, &config.collection_options())?;
        written.push(write_output(
            &output_dir,
            COLLECTION_FILE,
            collection_to_json(&collection)?,
        )?);
    }

    Ok(written)
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let config = Config::load_or_init(&args.config)?;
    run(&args.root, &config)?;
    Ok(())
}
