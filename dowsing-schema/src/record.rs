//! The typed aggregate every backend reader accumulates into.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

/// How a backend's `packages` argument was spelled.
///
/// `FindMarker` is the `["find:"]` sentinel list, which tells the reader to
/// look at the `find_packages_*` triple instead of treating the list
/// literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packages {
    Explicit(Vec<String>),
    Discover { where_: String, exclude: Vec<String>, include: Vec<String> },
    FindMarker,
    Unresolvable,
}

impl Default for Packages {
    fn default() -> Self {
        Packages::Explicit(Vec::new())
    }
}

impl Packages {
    pub fn is_truthy(&self) -> bool {
        match self {
            Packages::Explicit(v) => !v.is_empty(),
            Packages::Discover { .. } => true,
            Packages::FindMarker => true,
            Packages::Unresolvable => false,
        }
    }
}

/// `package_dir`, or the sentinel meaning "could not be resolved".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageDir {
    Map(BTreeMap<String, String>),
    Unresolvable,
}

impl Default for PackageDir {
    fn default() -> Self {
        PackageDir::Map(BTreeMap::new())
    }
}

impl PackageDir {
    pub fn is_truthy(&self) -> bool {
        matches!(self, PackageDir::Map(m) if !m.is_empty())
    }
}

/// The metadata a build would advertise, plus the setuptools-specific
/// bookkeeping (`packages_dict`, `pbr_*`) needed to compute it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub name: String,
    pub version: String,
    pub summary: String,
    pub description: String,
    pub license: String,
    pub home_page: String,
    pub metadata_version: String,
    pub description_content_type: String,
    pub author: String,
    pub author_email: String,
    pub maintainer: String,
    pub maintainer_email: String,

    pub keywords: Vec<String>,
    pub classifiers: Vec<String>,
    pub requires_dist: Vec<String>,
    pub requires_python: String,
    pub provides_extra: Vec<String>,

    pub project_urls: Vec<String>,
    pub entry_points: BTreeMap<String, Vec<String>>,

    pub packages: Packages,
    pub package_dir: PackageDir,
    pub packages_dict: BTreeMap<String, String>,
    pub py_modules: Vec<String>,

    pub setup_requires: Vec<String>,
    pub tests_require: Vec<String>,
    pub extras_require: BTreeMap<String, Vec<String>>,

    pub zip_safe: Option<bool>,
    pub include_package_data: Option<bool>,
    pub use_scm_version: Option<bool>,
    pub pbr: Option<bool>,

    pub source_mapping: Option<BTreeMap<String, String>>,

    pub pbr_packages_root: Option<String>,
    pub pbr_packages: Option<Vec<String>>,

    // Carried for completeness of the field schema; not consumed by the
    // layout algorithm but present because `setup()` accepts them and a
    // faithful setup.cfg round-trip needs somewhere to put them.
    pub scripts: Vec<String>,
    pub namespace_packages: Vec<String>,
    pub test_suite: String,
    pub test_loader: String,
    pub package_data: BTreeMap<String, Vec<String>>,
    pub data_files: BTreeMap<String, Vec<String>>,

    pub find_packages_where: Option<String>,
    pub find_packages_exclude: Vec<String>,
    pub find_packages_include: Vec<String>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes for external consumption, omitting empty/falsey slots.
    ///
    /// `source_mapping` serializes as an object of POSIX-path strings;
    /// `Discover` serializes as a tagged `{where, exclude, include}` object.
    pub fn as_dict(&self) -> Map<String, Json> {
        let mut out = Map::new();

        macro_rules! put_str {
            ($key:expr, $val:expr) => {
                if !$val.is_empty() {
                    out.insert($key.to_string(), Json::String($val.clone()));
                }
            };
        }
        macro_rules! put_list {
            ($key:expr, $val:expr) => {
                if !$val.is_empty() {
                    out.insert(
                        $key.to_string(),
                        Json::Array($val.iter().cloned().map(Json::String).collect()),
                    );
                }
            };
        }
        macro_rules! put_bool {
            ($key:expr, $val:expr) => {
                if let Some(b) = $val {
                    out.insert($key.to_string(), Json::Bool(b));
                }
            };
        }

        put_str!("name", self.name);
        put_str!("version", self.version);
        put_str!("summary", self.summary);
        put_str!("description", self.description);
        put_str!("license", self.license);
        put_str!("home_page", self.home_page);
        put_str!("metadata_version", self.metadata_version);
        put_str!("description_content_type", self.description_content_type);
        put_str!("author", self.author);
        put_str!("author_email", self.author_email);
        put_str!("maintainer", self.maintainer);
        put_str!("maintainer_email", self.maintainer_email);

        put_list!("keywords", self.keywords);
        put_list!("classifiers", self.classifiers);
        put_list!("requires_dist", self.requires_dist);
        put_str!("requires_python", self.requires_python);
        put_list!("provides_extra", self.provides_extra);
        put_list!("project_urls", self.project_urls);

        if !self.entry_points.is_empty() {
            out.insert("entry_points".to_string(), map_of_lists(&self.entry_points));
        }

        match &self.packages {
            Packages::Explicit(v) if !v.is_empty() => {
                out.insert(
                    "packages".to_string(),
                    Json::Array(v.iter().cloned().map(Json::String).collect()),
                );
            }
            Packages::Discover { where_, exclude, include } => {
                let mut m = Map::new();
                m.insert("where".to_string(), Json::String(where_.clone()));
                m.insert(
                    "exclude".to_string(),
                    Json::Array(exclude.iter().cloned().map(Json::String).collect()),
                );
                m.insert(
                    "include".to_string(),
                    Json::Array(include.iter().cloned().map(Json::String).collect()),
                );
                out.insert("packages".to_string(), Json::Object(m));
            }
            Packages::FindMarker => {
                out.insert(
                    "packages".to_string(),
                    Json::Array(vec![Json::String("find:".to_string())]),
                );
            }
            _ => {}
        }

        if let PackageDir::Map(m) = &self.package_dir {
            if !m.is_empty() {
                let mut obj = Map::new();
                for (k, v) in m {
                    obj.insert(k.clone(), Json::String(v.clone()));
                }
                out.insert("package_dir".to_string(), Json::Object(obj));
            }
        }

        if !self.packages_dict.is_empty() {
            let mut obj = Map::new();
            for (k, v) in &self.packages_dict {
                obj.insert(k.clone(), Json::String(v.clone()));
            }
            out.insert("packages_dict".to_string(), Json::Object(obj));
        }

        put_list!("py_modules", self.py_modules);
        put_list!("setup_requires", self.setup_requires);
        put_list!("tests_require", self.tests_require);

        if !self.extras_require.is_empty() {
            out.insert("extras_require".to_string(), map_of_lists(&self.extras_require));
        }

        put_bool!("zip_safe", self.zip_safe);
        put_bool!("include_package_data", self.include_package_data);
        put_bool!("use_scm_version", self.use_scm_version);
        put_bool!("pbr", self.pbr);

        if let Some(mapping) = &self.source_mapping {
            if !mapping.is_empty() {
                let mut obj = Map::new();
                for (k, v) in mapping {
                    obj.insert(k.clone(), Json::String(v.clone()));
                }
                out.insert("source_mapping".to_string(), Json::Object(obj));
            }
        }

        out
    }
}

fn map_of_lists(m: &BTreeMap<String, Vec<String>>) -> Json {
    let mut obj = Map::new();
    for (k, v) in m {
        obj.insert(
            k.clone(),
            Json::Array(v.iter().cloned().map(Json::String).collect()),
        );
    }
    Json::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_dict_omits_empty_fields() {
        let record = MetadataRecord::new();
        assert!(record.as_dict().is_empty());
    }

    #[test]
    fn as_dict_includes_name_when_set() {
        let mut record = MetadataRecord::new();
        record.name = "foo".to_string();
        let dict = record.as_dict();
        assert_eq!(dict.get("name").unwrap(), "foo");
    }

    #[test]
    fn discover_serializes_as_tagged_object() {
        let mut record = MetadataRecord::new();
        record.packages = Packages::Discover {
            where_: "src".to_string(),
            exclude: vec!["pkg.sub".to_string()],
            include: vec!["*".to_string()],
        };
        let dict = record.as_dict();
        let packages = dict.get("packages").unwrap().as_object().unwrap();
        assert_eq!(packages.get("where").unwrap(), "src");
    }

    #[test]
    fn unresolvable_packages_is_omitted() {
        let mut record = MetadataRecord::new();
        record.packages = Packages::Unresolvable;
        assert!(record.as_dict().get("packages").is_none());
    }
}
