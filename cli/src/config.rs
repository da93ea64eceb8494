#![deny(missing_docs)]

//! # Configuration
//!
//! YAML settings for the `generate` command. A missing file is replaced by
//! the defaults, which are written out so they can be edited.

use autodoc_core::{AppResult, CollectionOptions, OpenApiConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "autodoc/config.yaml";

/// Serialization format of the OpenAPI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenApiFileType {
    /// `openapi.yaml`
    #[default]
    Yaml,
    /// `openapi.json`
    Json,
}

impl OpenApiFileType {
    /// Output file name for this format.
    pub fn file_name(self) -> &'static str {
        match self {
            OpenApiFileType::Yaml => "openapi.yaml",
            OpenApiFileType::Json => "openapi.json",
        }
    }
}

/// Settings of the `generate` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving the generated files, relative to the scan root.
    pub output_dir: PathBuf,
    /// Write the OpenAPI document.
    pub generate_openapi: bool,
    /// Write the request collection.
    pub generate_postman_collection: bool,
    /// Format of the OpenAPI document.
    pub openapi_file_type: OpenApiFileType,
    /// Static OpenAPI front matter.
    pub openapi_config: OpenApiConfig,
    /// Display name of the request collection.
    pub collection_name: String,
    /// Base URL prefixed to collection requests.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let collection = CollectionOptions::default();
        Self {
            output_dir: PathBuf::from("autodoc"),
            generate_openapi: true,
            generate_postman_collection: true,
            openapi_file_type: OpenApiFileType::default(),
            openapi_config: OpenApiConfig::default(),
            collection_name: collection.name,
            base_url: collection.base_url,
        }
    }
}

impl Config {
    /// Collection settings derived from this config.
    pub fn collection_options(&self) -> CollectionOptions {
        CollectionOptions {
            name: self.collection_name.clone(),
            base_url: self.base_url.clone(),
        }
    }

    /// Loads `path`, writing and returning the defaults when it does not exist.
    pub fn load_or_init(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config not found, writing defaults");
            let config = Config::default();
            config.write(path)?;
            return Ok(config);
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Writes the config as YAML, creating parent directories.
    pub fn write(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// Arguments for the init command.
#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    /// Where to write the configuration file.
    #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Writes the default configuration.
pub fn execute_init(args: &InitArgs) -> AppResult<()> {
    Config::default().write(&args.config)?;
    info!(path = %args.config.display(), "wrote default config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("autodoc").join("config.yaml");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let again = Config::load_or_init(&path).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "openapi_file_type: json\ngenerate_postman_collection: false\nopenapi_config:\n  info:\n    title: Shop\n",
        )
        .unwrap();

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.openapi_file_type, OpenApiFileType::Json);
        assert!(!config.generate_postman_collection);
        assert!(config.generate_openapi);
        assert_eq!(config.openapi_config.info.title, "Shop");
        assert_eq!(config.openapi_config.info.version, "1.0.0");
        assert_eq!(config.output_dir, PathBuf::from("autodoc"));
        assert_eq!(config.collection_options(), CollectionOptions::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "generate_openapi: [not, a, bool]").unwrap();
        assert!(Config::load_or_init(&path).is_err());
    }

    #[test]
    fn test_init_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "collection_name: Old\n").unwrap();

        execute_init(&InitArgs {
            config: path.clone(),
        })
        .unwrap();
        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.collection_name, "Autodoc");
    }
}
