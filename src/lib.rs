//! Statically determines the build requirements, declared metadata, and
//! source-file layout of a source tree that follows the pyproject-style
//! build-backend convention, without running any build script.
//!
//! The legacy (setuptools-style) backend is the one with algorithmic
//! content: an abstract interpreter over `setup.py` ([`dowsing_pyast`])
//! merged with `setup.cfg` ([`ini_analyzer`]) by [`setuptools::read`].
//! Declarative-only backends are recognized by [`dispatch`] but not
//! analyzed.

pub mod cli;
mod discover;
mod dispatch;
pub mod error;
mod ini_analyzer;
pub mod markers;
mod setuptools;

pub use dowsing_schema::{Codec, Decoded, MetadataRecord, PackageDir, Packages};
pub use error::{DowsingError, Result};
pub use markers::Pep508Environment;

use std::path::Path;

/// Packages that must be installed before an sdist can be built.
pub fn requires_for_build_sdist(path: &Path, env: Option<&Pep508Environment>) -> Result<Vec<String>> {
    dispatch::requires_for_build_sdist(path, env)
}

/// Packages that must be installed before a wheel can be built.
pub fn requires_for_build_wheel(path: &Path, env: Option<&Pep508Environment>) -> Result<Vec<String>> {
    dispatch::requires_for_build_wheel(path, env)
}

/// The metadata record the built artifact would advertise.
pub fn metadata(path: &Path) -> Result<MetadataRecord> {
    dispatch::metadata(path)
}
