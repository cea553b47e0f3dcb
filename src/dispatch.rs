//! Reads the declarative `pyproject.toml`, if present, to select a reader
//! and collect the extra build requirements it declares.

use std::path::Path;

use dowsing_schema::MetadataRecord;
use serde::Deserialize;
use tracing::info;

use crate::error::{DowsingError, Result};
use crate::markers::Pep508Environment;
use crate::setuptools;

/// The backend named by `build-system.build-backend`, or the legacy
/// default when no declarative file (or no such key) is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// `setuptools.build_meta` / `setuptools.build_meta:__legacy__`, or no
    /// declaration at all — read via `setup.cfg`/`setup.py`.
    Legacy,
    /// A backend whose job is reading TOML fields straight into the
    /// metadata record, with no algorithmic content to analyze.
    Declarative { name: String },
}

#[derive(Debug, Default, Deserialize)]
struct PyprojectToml {
    #[serde(rename = "build-system")]
    build_system: Option<BuildSystem>,
}

#[derive(Debug, Default, Deserialize)]
struct BuildSystem {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(rename = "build-backend")]
    build_backend: Option<String>,
}

fn select_backend(build_backend: Option<&str>) -> Backend {
    match build_backend {
        None => Backend::Legacy,
        Some(name) if name.starts_with("setuptools.build_meta") => Backend::Legacy,
        Some(name) => Backend::Declarative { name: name.to_string() },
    }
}

fn read_pyproject(root: &Path) -> Result<(Backend, Vec<String>)> {
    let path = root.join("pyproject.toml");
    if !path.is_file() {
        return Ok((Backend::Legacy, Vec::new()));
    }
    let contents = fs_err::read_to_string(&path).map_err(|source| DowsingError::IoFailure {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: PyprojectToml = toml::from_str(&contents).map_err(|err| DowsingError::ParseFailure {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let build_system = parsed.build_system.unwrap_or_default();
    let backend = select_backend(build_system.build_backend.as_deref());
    Ok((backend, build_system.requires))
}

fn require_legacy(root: &Path, backend: &Backend) -> Result<()> {
    match backend {
        Backend::Legacy => Ok(()),
        Backend::Declarative { name } => Err(DowsingError::UnsupportedBackend {
            backend: name.clone(),
            path: root.join("pyproject.toml").display().to_string(),
        }),
    }
}

pub fn requires_for_build_sdist(root: &Path, env: Option<&Pep508Environment>) -> Result<Vec<String>> {
    let (backend, toml_requires) = read_pyproject(root)?;
    require_legacy(root, &backend)?;
    info!(backend = "legacy", "selected build backend");
    let record = setuptools::read(root)?;
    let mut requires = toml_requires;
    requires.extend(setuptools::sdist_requires(&record));
    Ok(filter(requires, env))
}

pub fn requires_for_build_wheel(root: &Path, env: Option<&Pep508Environment>) -> Result<Vec<String>> {
    let (backend, toml_requires) = read_pyproject(root)?;
    require_legacy(root, &backend)?;
    info!(backend = "legacy", "selected build backend");
    let record = setuptools::read(root)?;
    let mut requires = toml_requires;
    requires.extend(setuptools::wheel_requires(&record));
    Ok(filter(requires, env))
}

pub fn metadata(root: &Path) -> Result<MetadataRecord> {
    let (backend, _) = read_pyproject(root)?;
    require_legacy(root, &backend)?;
    info!(backend = "legacy", "selected build backend");
    setuptools::read(root)
}

fn filter(requires: Vec<String>, env: Option<&Pep508Environment>) -> Vec<String> {
    match env {
        Some(env) => env.filter(&requires),
        None => requires,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backend_key_defaults_to_legacy() {
        assert_eq!(select_backend(None), Backend::Legacy);
    }

    #[test]
    fn setuptools_build_meta_is_legacy() {
        assert_eq!(select_backend(Some("setuptools.build_meta")), Backend::Legacy);
        assert_eq!(select_backend(Some("setuptools.build_meta:__legacy__")), Backend::Legacy);
    }

    #[test]
    fn other_backends_are_declarative() {
        assert_eq!(
            select_backend(Some("flit_core.buildapi")),
            Backend::Declarative { name: "flit_core.buildapi".to_string() }
        );
    }
}
