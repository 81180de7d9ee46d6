//! Manifest parsing for node projects.
//!
//! A manifest (`package.json`) declares a project's dependencies as a map of
//! name to version constraint, plus an optional `devDependencies` map of the
//! same shape. The engine consumes manifests and never writes them; each one
//! is read once, immediately after its directory's content is materialized.
//!
//! Declared key order is preserved: dependencies install strictly in the
//! order the manifest lists them.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// The manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// The per-project directory packages are installed under.
pub const PACKAGES_DIR: &str = "node_modules";

/// Errors from manifest loading.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No manifest file exists at the given directory.
    #[error("no {MANIFEST_FILE} in {}", .0.display())]
    Missing(PathBuf),

    /// The manifest exists but could not be read.
    #[error("failed to read {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    /// The manifest is not valid JSON, or a dependency entry is not a
    /// name-to-string pair.
    #[error("malformed {MANIFEST_FILE} in {dir}: {msg}", dir = .0.display(), msg = .1)]
    Malformed(PathBuf, String),
}

/// Wire shape of the fields we consume. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Map<String, Value>,
}

/// A project manifest: ordered dependency declarations.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Production dependencies, in declared order.
    pub dependencies: Vec<(String, String)>,
    /// Development dependencies, in declared order.
    pub dev_dependencies: Vec<(String, String)>,
}

impl Manifest {
    /// Path of the manifest inside a package or project directory.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Whether a manifest exists at the given directory.
    pub fn exists(dir: &Path) -> bool {
        Self::path_in(dir).exists()
    }

    /// Load and parse the manifest in `dir`.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Missing`] if there is no manifest,
    /// [`ManifestError::Malformed`] if it cannot be parsed.
    pub async fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = Self::path_in(dir);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::Missing(dir.to_path_buf()));
            }
            Err(err) => return Err(ManifestError::Io(path, err)),
        };

        let raw: RawManifest = serde_json::from_str(&content)
            .map_err(|err| ManifestError::Malformed(dir.to_path_buf(), err.to_string()))?;

        Ok(Self {
            dependencies: pairs(dir, raw.dependencies)?,
            dev_dependencies: pairs(dir, raw.dev_dependencies)?,
        })
    }
}

/// Flatten a dependency map into ordered (name, constraint) pairs.
fn pairs(dir: &Path, map: Map<String, Value>) -> Result<Vec<(String, String)>, ManifestError> {
    map.into_iter()
        .map(|(name, value)| match value {
            Value::String(constraint) => Ok((name, constraint)),
            other => Err(ManifestError::Malformed(
                dir.to_path_buf(),
                format!("dependency {name:?} must be a string, got {other}"),
            )),
        })
        .collect()
}
