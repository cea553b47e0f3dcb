//! A concrete PEP 508 marker environment for filtering build requirements
//! by target platform, restating the eleven standard markers
//! (<https://peps.python.org/pep-0508/#environment-markers>) as a value the
//! caller constructs once and passes through.

use std::collections::BTreeMap;

use pep508_rs::{MarkerEnvironment, Requirement};
use serde_json::json;

/// Wraps a [`MarkerEnvironment`] built from CPython-on-Linux defaults,
/// individually overridable by the CLI's `--marker key=value` flags.
#[derive(Debug, Clone)]
pub struct Pep508Environment {
    inner: MarkerEnvironment,
}

impl Pep508Environment {
    /// Builds an environment from defaults, overridden by `overrides`.
    /// Unknown keys are ignored.
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let mut fields = default_fields();
        for (key, value) in overrides {
            if let Some(slot) = fields.get_mut(key.as_str()) {
                *slot = value.clone();
            }
        }
        let value = json!({
            "implementation_name": fields["implementation_name"],
            "implementation_version": fields["implementation_version"],
            "os_name": fields["os_name"],
            "platform_machine": fields["platform_machine"],
            "platform_python_implementation": fields["platform_python_implementation"],
            "platform_release": fields["platform_release"],
            "platform_system": fields["platform_system"],
            "platform_version": fields["platform_version"],
            "python_full_version": fields["python_full_version"],
            "python_version": fields["python_version"],
            "sys_platform": fields["sys_platform"],
        });
        let inner: MarkerEnvironment =
            serde_json::from_value(value).expect("static default environment is well-formed");
        Pep508Environment { inner }
    }

    /// Whether `requirement`'s marker, if any, evaluates true. Requirements
    /// without a marker always match.
    pub fn matches(&self, requirement: &Requirement) -> bool {
        match &requirement.marker {
            Some(marker) => marker.evaluate(&self.inner, &[]),
            None => true,
        }
    }

    /// Filters `requirements` to those whose marker passes (or has none),
    /// dropping any string that fails to parse as a PEP 508 requirement.
    pub fn filter(&self, requirements: &[String]) -> Vec<String> {
        requirements
            .iter()
            .filter(|raw| match raw.parse::<Requirement>() {
                Ok(requirement) => self.matches(&requirement),
                Err(_) => true,
            })
            .cloned()
            .collect()
    }
}

fn default_fields() -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("implementation_name", "cpython".to_string()),
        ("implementation_version", "3.11.0".to_string()),
        ("os_name", "posix".to_string()),
        ("platform_machine", "x86_64".to_string()),
        ("platform_python_implementation", "CPython".to_string()),
        ("platform_release", String::new()),
        ("platform_system", "Linux".to_string()),
        ("platform_version", String::new()),
        ("python_full_version", "3.11.0".to_string()),
        ("python_version", "3.11".to_string()),
        ("sys_platform", "linux".to_string()),
    ])
}
