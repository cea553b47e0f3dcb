//! Parses `setup.cfg`, walking the field schema to populate a typed record.
//!
//! Dashes and underscores are interchangeable in keys: a direct lookup is
//! tried first, then the key with dashes and underscores swapped.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use configparser::ini::Ini;
use dowsing_schema::{Codec, Decoded, FieldSchema, MetadataRecord, PackageDir, Packages, SETUP_ARGS};
use tracing::debug;

use crate::error::{DowsingError, Result};

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

pub fn parse(path: &Path) -> Result<MetadataRecord> {
    let contents = fs_err::read_to_string(path).map_err(|source| DowsingError::IoFailure {
        path: path.display().to_string(),
        source,
    })?;

    let mut parser = Ini::new();
    let map = parser.read(contents).map_err(|message| DowsingError::ParseFailure {
        path: path.display().to_string(),
        message,
    })?;

    let mut record = MetadataRecord::new();
    for field in SETUP_ARGS {
        if field.ini.section == "--unused--" {
            continue;
        }
        if field.ini.codec == Codec::Section {
            apply_section(&mut record, field, &map);
            continue;
        }
        let Some(raw) = lookup(&map, field.ini.section, field.ini.key) else {
            continue;
        };
        apply_scalar(&mut record, field, field.ini.codec.from_ini(&raw));
    }

    record.metadata_version = "2.1".to_string();
    Ok(record)
}

fn lookup(map: &IniMap, section: &str, key: &str) -> Option<String> {
    let section_map = map.get(&section.to_lowercase())?;
    if let Some(Some(value)) = section_map.get(&key.to_lowercase()) {
        return Some(value.clone());
    }
    let swapped = swap_dash_underscore(key);
    section_map.get(&swapped.to_lowercase())?.clone()
}

fn swap_dash_underscore(key: &str) -> String {
    if key.contains('-') {
        key.replace('-', "_")
    } else {
        key.replace('_', "-")
    }
}

fn apply_scalar(record: &mut MetadataRecord, field: &FieldSchema, decoded: Decoded) {
    match (field.storage_key(), decoded) {
        ("name", Decoded::Str(v)) => record.name = v,
        ("version", Decoded::Str(v)) => record.version = v,
        ("author", Decoded::Str(v)) => record.author = v,
        ("author_email", Decoded::Str(v)) => record.author_email = v,
        ("license", Decoded::Str(v)) => record.license = v,
        ("home_page", Decoded::Str(v)) => record.home_page = v,
        ("summary", Decoded::Str(v)) => record.summary = v,
        ("description", Decoded::Str(v)) => record.description = v,
        ("keywords", Decoded::List(v)) => record.keywords = v,
        ("classifiers", Decoded::List(v)) => record.classifiers = v,
        ("maintainer", Decoded::Str(v)) => record.maintainer = v,
        ("maintainer_email", Decoded::Str(v)) => record.maintainer_email = v,
        ("requires_python", Decoded::Str(v)) => record.requires_python = v,
        ("project_urls", Decoded::Dict(pairs)) => {
            record.project_urls = pairs.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
        }
        ("description_content_type", Decoded::Str(v)) => record.description_content_type = v,
        ("zip_safe", Decoded::Bool(v)) => record.zip_safe = Some(v),
        ("setup_requires", Decoded::List(v)) => record.setup_requires = v,
        ("requires_dist", Decoded::List(v)) => record.requires_dist = v,
        ("tests_require", Decoded::List(v)) => record.tests_require = v,
        ("include_package_data", Decoded::Bool(v)) => record.include_package_data = Some(v),
        ("scripts", Decoded::List(v)) => record.scripts = v,
        ("packages", Decoded::List(v)) => {
            record.packages = if v == ["find:".to_string()] {
                Packages::FindMarker
            } else {
                Packages::Explicit(v)
            };
        }
        ("package_dir", Decoded::Dict(pairs)) => {
            record.package_dir = PackageDir::Map(pairs.into_iter().collect());
        }
        ("namespace_packages", Decoded::List(v)) => record.namespace_packages = v,
        ("py_modules", Decoded::List(v)) => record.py_modules = v,
        ("test_suite", Decoded::Str(v)) => record.test_suite = v,
        ("test_loader", Decoded::Str(v)) => record.test_loader = v,
        ("find_packages_where", Decoded::Str(v)) => record.find_packages_where = Some(v),
        ("find_packages_exclude", Decoded::List(v)) => record.find_packages_exclude = v,
        ("find_packages_include", Decoded::List(v)) => record.find_packages_include = v,
        ("pbr_packages_root", Decoded::Str(v)) => record.pbr_packages_root = Some(v),
        ("pbr_packages", Decoded::List(v)) => record.pbr_packages = Some(v),
        (slot, _) => debug!(slot, "unexpected codec/decoded pairing, ignoring"),
    }
}

fn apply_section(record: &mut MetadataRecord, field: &FieldSchema, map: &IniMap) {
    let Some(section_map) = map.get(&field.ini.section.to_lowercase()) else {
        return;
    };
    let mut flat = BTreeMap::new();
    for (key, value) in section_map {
        flat.insert(key.clone(), value.clone().unwrap_or_default());
    }
    let Decoded::Section(decoded) = Codec::Section.from_ini_section(&flat) else {
        unreachable!("Codec::Section always decodes to Decoded::Section")
    };
    match field.keyword {
        "extras_require" => record.extras_require = decoded,
        "package_data" => record.package_data = decoded,
        "data_files" => record.data_files = decoded,
        "entry_points" => record.entry_points = decoded,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    fn write_cfg(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.cfg");
        fs_err::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_basic_metadata_and_options() {
        let (_dir, path) = write_cfg(indoc! {"
            [metadata]
            name = foo

            [options]
            install_requires = abc
            setup_requires = def
        "});
        let record = parse(&path).unwrap();
        assert_eq!(record.name, "foo");
        assert_eq!(record.requires_dist, vec!["abc".to_string()]);
        assert_eq!(record.setup_requires, vec!["def".to_string()]);
        assert_eq!(record.metadata_version, "2.1");
    }

    #[test]
    fn dash_keys_fall_back_to_underscore_schema() {
        let (_dir, path) = write_cfg(indoc! {"
            [options]
            install-requires = abc
        "});
        let record = parse(&path).unwrap();
        assert_eq!(record.requires_dist, vec!["abc".to_string()]);
    }

    #[test]
    fn find_marker_is_recognized() {
        let (_dir, path) = write_cfg(indoc! {"
            [options]
            packages = find:
        "});
        let record = parse(&path).unwrap();
        assert_eq!(record.packages, Packages::FindMarker);
    }

    #[test]
    fn entry_points_section_is_captured() {
        let (_dir, path) = write_cfg(indoc! {"
            [options.entry_points]
            console_scripts =
                foo = foo:main
        "});
        let record = parse(&path).unwrap();
        assert_eq!(
            record.entry_points.get("console_scripts"),
            Some(&vec!["foo = foo:main".to_string()])
        );
    }
}
