//! Runtime configuration for the generator.
//!
//! Configuration is read from a TOML, YAML or JSON file. Lookup order when no
//! explicit file is given:
//! 1. `./formgen.toml` in the current working directory
//! 2. `<config dir>/formgen/config.toml` (e.g. `~/.config/formgen/config.toml`)
//! 3. built-in defaults
//!
//! The `FORMGEN_TEMPLATE_DIR` environment variable overrides the template
//! root regardless of where the rest of the configuration came from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::generation::ArtifactType;

/// Environment variable that overrides [`Config::templates_dir`]
pub const TEMPLATE_DIR_ENV: &str = "FORMGEN_TEMPLATE_DIR";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "formgen.toml";

/// Trait for reading environment configuration, allowing dependency injection for testing
pub trait ConfigReader {
    fn get_template_dir(&self) -> Option<String>;
}

/// Production implementation that reads from environment variables
pub struct EnvConfigReader;

impl ConfigReader for EnvConfigReader {
    fn get_template_dir(&self) -> Option<String> {
        std::env::var(TEMPLATE_DIR_ENV).ok()
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding the template source files
    pub templates_dir: PathBuf,
    /// Directory under which organized output folders are created
    pub output_dir: PathBuf,
    /// Directory receiving the packaged archives. Kept beside `output_dir`
    /// by default; a project folder may never overlap it.
    pub archive_dir: PathBuf,
    /// Optional YAML manifest replacing the built-in template catalogue
    pub registry_manifest: Option<PathBuf>,
    /// Per-type folder overrides merged over the default layout
    pub folder_layout: BTreeMap<ArtifactType, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("generated"),
            archive_dir: PathBuf::from("archives"),
            registry_manifest: None,
            folder_layout: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file, choosing the format from its extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read configuration {}: {e}",
                path.display()
            ))
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::parse(&content, path)
    }

    /// Parse configuration content; `path` is only used to pick the format.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") | None => Ok(toml::from_str(content)?),
            Some("yml") | Some("yaml") => Ok(serde_yaml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            Some(other) => Err(Error::config(format!(
                "Unsupported configuration format '{other}' for {}",
                path.display()
            ))),
        }
    }

    /// Resolve configuration from an explicit file, the well-known locations,
    /// or defaults, then apply environment overrides.
    pub async fn discover(explicit: Option<&Path>, reader: &dyn ConfigReader) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path).await?,
            None => match Self::default_locations().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::load(&path).await?,
                None => Self::default(),
            },
        };

        if let Some(dir) = reader.get_template_dir() {
            debug!(template_dir = %dir, "Template directory overridden from environment");
            config.templates_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("formgen").join("config.toml"));
        }
        locations
    }
}

#[cfg(test)]
pub struct MockConfigReader(pub Option<String>);

#[cfg(test)]
impl ConfigReader for MockConfigReader {
    fn get_template_dir(&self) -> Option<String> {
        self.0.clone()
    }
}
