//! The static table mapping installer keyword arguments to setup.cfg
//! fields, mirroring `setuptools.setup()`'s documented keywords.
//!
//! This is process-wide and immutable after startup: a plain `&'static`
//! slice, looked up by keyword or by storage slot, never mutated.

use crate::codec::Codec;

/// Where a field lives in setup.cfg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IniLocation {
    pub section: &'static str,
    pub key: &'static str,
    pub codec: Codec,
}

impl IniLocation {
    pub const fn new(section: &'static str, key: &'static str, codec: Codec) -> Self {
        IniLocation { section, key, codec }
    }
}

/// The external metadata name a field corresponds to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataName {
    pub key: &'static str,
    pub repeated: bool,
}

/// One recognized `setup()` keyword and how it maps to setup.cfg / metadata.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// The keyword argument name accepted by the installer call.
    pub keyword: &'static str,
    pub ini: IniLocation,
    pub metadata: Option<MetadataName>,
    /// The slot name on `MetadataRecord`, if it differs from `keyword`.
    pub storage_slot: Option<&'static str>,
}

impl FieldSchema {
    /// The `MetadataRecord` field this schema entry writes.
    pub fn storage_key(&self) -> &'static str {
        self.storage_slot.unwrap_or(self.keyword)
    }
}

macro_rules! field {
    ($keyword:expr, $section:expr, $key:expr, $codec:expr) => {
        FieldSchema {
            keyword: $keyword,
            ini: IniLocation::new($section, $key, $codec),
            metadata: None,
            storage_slot: None,
        }
    };
    ($keyword:expr, $section:expr, $key:expr, $codec:expr, meta = $meta:expr) => {
        FieldSchema {
            keyword: $keyword,
            ini: IniLocation::new($section, $key, $codec),
            metadata: Some(MetadataName { key: $meta, repeated: false }),
            storage_slot: None,
        }
    };
    ($keyword:expr, $section:expr, $key:expr, $codec:expr, meta = $meta:expr, repeated) => {
        FieldSchema {
            keyword: $keyword,
            ini: IniLocation::new($section, $key, $codec),
            metadata: Some(MetadataName { key: $meta, repeated: true }),
            storage_slot: None,
        }
    };
    ($keyword:expr, $section:expr, $key:expr, $codec:expr, meta = $meta:expr, slot = $slot:expr) => {
        FieldSchema {
            keyword: $keyword,
            ini: IniLocation::new($section, $key, $codec),
            metadata: Some(MetadataName { key: $meta, repeated: false }),
            storage_slot: Some($slot),
        }
    };
    ($keyword:expr, $section:expr, $key:expr, $codec:expr, meta = $meta:expr, repeated, slot = $slot:expr) => {
        FieldSchema {
            keyword: $keyword,
            ini: IniLocation::new($section, $key, $codec),
            metadata: Some(MetadataName { key: $meta, repeated: true }),
            storage_slot: Some($slot),
        }
    };
}

/// The full set of recognized `setup()` keywords, ordered the way
/// `distutils.dist._METHOD_BASENAMES` documents metadata 1.0 fields, then
/// the `[options]`-only fields that never reach PKG-INFO.
pub static SETUP_ARGS: &[FieldSchema] = &[
    field!("name", "metadata", "name", Codec::Str, meta = "Name"),
    field!("version", "metadata", "version", Codec::Str, meta = "Version"),
    field!("author", "metadata", "author", Codec::Str, meta = "Author"),
    field!("author_email", "metadata", "author_email", Codec::Str, meta = "Author-email"),
    field!("license", "metadata", "license", Codec::Str, meta = "License"),
    field!("url", "metadata", "url", Codec::Str, meta = "Home-page", slot = "home_page"),
    field!("description", "metadata", "description", Codec::Str, meta = "Summary", slot = "summary"),
    field!(
        "long_description",
        "metadata",
        "long_description",
        Codec::Str,
        meta = "Description",
        slot = "description"
    ),
    field!(
        "keywords",
        "metadata",
        "keywords",
        Codec::ListNewlineCompat,
        meta = "Keywords"
    ),
    field!(
        "classifiers",
        "metadata",
        "classifiers",
        Codec::ListNewline,
        meta = "Classifier",
        repeated
    ),
    field!("maintainer", "metadata", "maintainer", Codec::Str, meta = "Maintainer"),
    field!(
        "maintainer_email",
        "metadata",
        "maintainer_email",
        Codec::Str,
        meta = "Maintainer-email"
    ),
    field!(
        "python_requires",
        "options",
        "python_requires",
        Codec::Str,
        meta = "Requires-Python",
        slot = "requires_python"
    ),
    field!(
        "project_urls",
        "metadata",
        "project_urls",
        Codec::Dict,
        meta = "Project-URL",
        repeated
    ),
    field!(
        "long_description_content_type",
        "metadata",
        "long_description_content_type",
        Codec::Str,
        meta = "Description-Content-Type",
        slot = "description_content_type"
    ),
    field!("zip_safe", "options", "zip_safe", Codec::Bool),
    field!("setup_requires", "options", "setup_requires", Codec::ListNewline),
    field!(
        "install_requires",
        "options",
        "install_requires",
        Codec::ListNewline,
        meta = "Requires-Dist",
        repeated,
        slot = "requires_dist"
    ),
    field!("tests_require", "options", "tests_require", Codec::ListNewline),
    field!("include_package_data", "options", "include_package_data", Codec::Bool),
    field!("extras_require", "options.extras_require", "", Codec::Section),
    field!("scripts", "options", "scripts", Codec::ListNewline),
    field!("packages", "options", "packages", Codec::ListNewline),
    field!("package_dir", "options", "package_dir", Codec::Dict),
    field!("package_data", "options.package_data", "", Codec::Section),
    field!("namespace_packages", "options", "namespace_packages", Codec::ListNewline),
    field!("py_modules", "options", "py_modules", Codec::ListNewline),
    field!("data_files", "options.data_files", "", Codec::Section),
    field!("entry_points", "options.entry_points", "", Codec::Section),
    field!("test_suite", "options", "test_suite", Codec::Str),
    field!("test_loader", "options", "test_loader", Codec::Str),
    field!("find_packages_where", "options.packages.find", "where", Codec::Str),
    field!(
        "find_packages_exclude",
        "options.packages.find",
        "exclude",
        Codec::ListNewline
    ),
    field!(
        "find_packages_include",
        "options.packages.find",
        "include",
        Codec::ListNewline
    ),
    field!("pbr", "--unused--", "--unused--", Codec::Bool),
    field!(
        "pbr_packages_root",
        "files",
        "packages_root",
        Codec::Str
    ),
    field!("pbr_packages", "files", "packages", Codec::ListNewline),
];

pub fn by_keyword(keyword: &str) -> Option<&'static FieldSchema> {
    SETUP_ARGS.iter().find(|f| f.keyword == keyword)
}

pub fn by_storage_slot(slot: &str) -> Option<&'static FieldSchema> {
    SETUP_ARGS.iter().find(|f| f.storage_key() == slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for field in SETUP_ARGS {
            assert!(seen.insert(field.keyword), "duplicate keyword {}", field.keyword);
        }
    }

    #[test]
    fn name_maps_to_metadata_section() {
        let field = by_keyword("name").unwrap();
        assert_eq!(field.ini.section, "metadata");
        assert_eq!(field.storage_key(), "name");
    }

    #[test]
    fn url_stores_under_home_page() {
        let field = by_keyword("url").unwrap();
        assert_eq!(field.storage_key(), "home_page");
        assert_eq!(field.metadata.unwrap().key, "Home-page");
    }
}
