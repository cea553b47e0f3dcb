//! The legacy (setuptools-style) reader: merges `setup.cfg` and `setup.py`
//! into one [`MetadataRecord`], then computes `packages_dict` and
//! `source_mapping` from the filesystem.

use std::collections::BTreeMap;
use std::path::Path;

use dowsing_pyast::{analyze, parse_module, AnalyzerError, Value};
use dowsing_schema::{MetadataRecord, PackageDir, Packages};
use tracing::debug;
use walkdir::WalkDir;

use crate::discover::find_packages;
use crate::error::{DowsingError, Result};
use crate::ini_analyzer;

/// setuptools is both the sdist and wheel builder for the legacy backend;
/// building a wheel additionally needs the wheel-packaging helper.
const SETUPTOOLS: &str = "setuptools";
const WHEEL: &str = "wheel";

pub fn read(root: &Path) -> Result<MetadataRecord> {
    let mut record = read_ini_if_present(root)?;
    overlay_script(root, &mut record)?;
    apply_pbr_compat(&mut record);
    let mangle = prepare_package_dir(&mut record);
    populate_packages_dict(&mut record, root, mangle.as_ref());
    materialize_source_mapping(&mut record, root);
    Ok(record)
}

pub fn sdist_requires(record: &MetadataRecord) -> Vec<String> {
    let mut requires = vec![SETUPTOOLS.to_string()];
    requires.extend(record.setup_requires.iter().cloned());
    requires
}

pub fn wheel_requires(record: &MetadataRecord) -> Vec<String> {
    let mut requires = vec![SETUPTOOLS.to_string(), WHEEL.to_string()];
    requires.extend(record.setup_requires.iter().cloned());
    requires
}

fn read_ini_if_present(root: &Path) -> Result<MetadataRecord> {
    let cfg = root.join("setup.cfg");
    if cfg.is_file() {
        ini_analyzer::parse(&cfg)
    } else {
        let mut record = MetadataRecord::new();
        record.metadata_version = "2.1".to_string();
        Ok(record)
    }
}

/// Runs the script analyzer against `setup.py`, if present, and copies
/// every truthy captured slot into `record` (script overrides INI).
fn overlay_script(root: &Path, record: &mut MetadataRecord) -> Result<()> {
    let script = root.join("setup.py");
    if !script.is_file() {
        return Ok(());
    }
    let source = fs_err::read_to_string(&script).map_err(|source| DowsingError::IoFailure {
        path: script.display().to_string(),
        source,
    })?;
    let module = parse_module(&source, &script.display().to_string()).map_err(|err| {
        DowsingError::ParseFailure {
            path: script.display().to_string(),
            message: err.to_string(),
        }
    })?;
    let captured = analyze(&module).map_err(|err| match err {
        AnalyzerError::NoInstallerCall => DowsingError::NoInstallerCall(script.display().to_string()),
    })?;

    overlay_str(&mut record.name, captured.get("name"));
    overlay_str(&mut record.version, captured.get("version"));
    overlay_str(&mut record.author, captured.get("author"));
    overlay_str(&mut record.author_email, captured.get("author_email"));
    overlay_str(&mut record.license, captured.get("license"));
    overlay_str(&mut record.home_page, captured.get("url"));
    overlay_str(&mut record.summary, captured.get("description"));
    overlay_str(&mut record.description, captured.get("long_description"));
    overlay_str(&mut record.maintainer, captured.get("maintainer"));
    overlay_str(&mut record.maintainer_email, captured.get("maintainer_email"));
    overlay_str(&mut record.requires_python, captured.get("python_requires"));
    overlay_str(
        &mut record.description_content_type,
        captured.get("long_description_content_type"),
    );
    overlay_str(&mut record.test_suite, captured.get("test_suite"));
    overlay_str(&mut record.test_loader, captured.get("test_loader"));

    overlay_list(&mut record.keywords, captured.get("keywords"));
    overlay_list(&mut record.classifiers, captured.get("classifiers"));
    overlay_list(&mut record.setup_requires, captured.get("setup_requires"));
    overlay_list(&mut record.requires_dist, captured.get("install_requires"));
    overlay_list(&mut record.tests_require, captured.get("tests_require"));
    overlay_list(&mut record.scripts, captured.get("scripts"));
    overlay_list(&mut record.namespace_packages, captured.get("namespace_packages"));
    overlay_list(&mut record.py_modules, captured.get("py_modules"));

    overlay_bool(&mut record.zip_safe, captured.get("zip_safe"));
    overlay_bool(&mut record.include_package_data, captured.get("include_package_data"));
    overlay_bool(&mut record.pbr, captured.get("pbr"));

    overlay_project_urls(&mut record.project_urls, captured.get("project_urls"));
    overlay_dict_of_lists(&mut record.extras_require, captured.get("extras_require"));
    overlay_dict_of_lists(&mut record.entry_points, captured.get("entry_points"));

    let package_dir_value = captured.get("package_dir");
    if package_dir_value.is_unresolvable() {
        record.package_dir = PackageDir::Unresolvable;
    } else {
        let dict = package_dir_value.into_string_dict();
        if !dict.is_empty() {
            record.package_dir = PackageDir::Map(dict);
        }
    }

    overlay_packages(record, captured.get("packages"));

    Ok(())
}

fn overlay_str(slot: &mut String, value: Value) {
    if let Some(s) = value.as_str() {
        if !s.is_empty() {
            *slot = s.to_string();
        }
    }
}

fn overlay_list(slot: &mut Vec<String>, value: Value) {
    let list = value.into_string_list();
    if !list.is_empty() {
        *slot = list;
    }
}

fn overlay_bool(slot: &mut Option<bool>, value: Value) {
    if let Value::Bool(b) = value {
        *slot = Some(b);
    }
}

/// `project_urls={"label": "url"}` flattens to the same `"label=url"`
/// strings the INI codec produces, mirroring `ini_analyzer`'s handling.
fn overlay_project_urls(slot: &mut Vec<String>, value: Value) {
    let dict = value.into_string_dict();
    if !dict.is_empty() {
        *slot = dict.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
    }
}

fn overlay_dict_of_lists(slot: &mut BTreeMap<String, Vec<String>>, value: Value) {
    let dict = value.into_string_dict_of_lists();
    if !dict.is_empty() {
        *slot = dict;
    }
}

fn overlay_packages(record: &mut MetadataRecord, value: Value) {
    match value {
        Value::Discover { where_, exclude, include } => {
            let where_ = where_.as_str().unwrap_or(".").to_string();
            let exclude = exclude.into_string_list();
            let include = include.into_string_list();
            record.packages = Packages::Discover { where_, exclude, include };
        }
        Value::Unresolvable => {
            // Falsey in the override step; the INI-derived value stands.
        }
        other => {
            let list = other.into_string_list();
            if !list.is_empty() {
                record.packages = if list == ["find:".to_string()] {
                    Packages::FindMarker
                } else {
                    Packages::Explicit(list)
                };
            }
        }
    }
}

/// pbr fires when `pbr` is truthy, or `pbr_packages` is set while
/// `packages` is still empty (pbr's own setup.cfg never declares
/// `packages` directly).
fn apply_pbr_compat(record: &mut MetadataRecord) {
    let pbr_enabled = record.pbr == Some(true)
        || (record.pbr_packages.is_some() && !record.packages.is_truthy());
    if !pbr_enabled {
        return;
    }
    debug!("pbr compatibility branch engaged");

    if let Some(root) = &record.pbr_packages_root {
        let mut map = BTreeMap::new();
        map.insert(String::new(), root.clone());
        record.package_dir = PackageDir::Map(map);
    }

    if let Some(packages) = &record.pbr_packages {
        record.packages = Packages::Explicit(packages.clone());
    } else {
        let root = record.pbr_packages_root.clone().unwrap_or_else(|| ".".to_string());
        record.packages = Packages::Discover { where_: root, exclude: Vec::new(), include: vec!["*".to_string()] };
    }
}

/// Normalizes `package_dir` and returns the lookup closure implementing
/// `mangle`, or `None` when remapping must be skipped (the Unresolvable
/// sentinel).
fn prepare_package_dir(record: &mut MetadataRecord) -> Option<BTreeMap<String, String>> {
    match &record.package_dir {
        PackageDir::Unresolvable => None,
        PackageDir::Map(map) => {
            let mut normalized = map.clone();
            normalized.entry(String::new()).or_insert_with(|| ".".to_string());
            record.package_dir = PackageDir::Map(normalized.clone());
            Some(normalized)
        }
    }
}

fn mangle(package_dir: &BTreeMap<String, String>, dotted: &str) -> String {
    let prefix = longest_prefix(package_dir, dotted);
    let base = package_dir.get(prefix).map(String::as_str).unwrap_or(".");
    let suffix = if prefix.is_empty() {
        dotted.to_string()
    } else {
        dotted.strip_prefix(prefix).unwrap_or(dotted).trim_start_matches('.').to_string()
    };
    let suffix_path = suffix.replace('.', "/");
    normalize_join(base, &suffix_path)
}

/// Iterates dotted prefixes of decreasing length (the full name, then each
/// shorter prefix, then the empty prefix) returning the first present as a
/// key in `package_dir`.
fn longest_prefix<'a>(package_dir: &BTreeMap<String, String>, dotted: &'a str) -> &'a str {
    let parts: Vec<&str> = dotted.split('.').collect();
    for len in (0..=parts.len()).rev() {
        let candidate = if len == 0 { "" } else { &dotted[..prefix_byte_len(&parts, len)] };
        if package_dir.contains_key(candidate) {
            return candidate;
        }
    }
    ""
}

fn prefix_byte_len(parts: &[&str], len: usize) -> usize {
    parts[..len].iter().map(|p| p.len()).sum::<usize>() + len.saturating_sub(1)
}

fn normalize_join(base: &str, suffix: &str) -> String {
    let joined = if suffix.is_empty() {
        base.to_string()
    } else if base.is_empty() || base == "." {
        suffix.to_string()
    } else {
        format!("{base}/{suffix}")
    };
    posix_normalize(&joined)
}

fn posix_normalize(path: &str) -> String {
    let mut parts = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn populate_packages_dict(record: &mut MetadataRecord, root: &Path, package_dir: Option<&BTreeMap<String, String>>) {
    let Some(package_dir) = package_dir else {
        return;
    };

    match record.packages.clone() {
        Packages::Discover { where_, exclude, include } => {
            for dotted in find_packages(root, &where_, &exclude, &include) {
                let mapped = mangle(package_dir, &dotted);
                record.packages_dict.insert(dotted, mapped);
            }
        }
        Packages::FindMarker => {
            let where_ = record.find_packages_where.clone().unwrap_or_else(|| ".".to_string());
            let exclude = record.find_packages_exclude.clone();
            let include = if record.find_packages_include.is_empty() {
                vec!["*".to_string()]
            } else {
                record.find_packages_include.clone()
            };
            for dotted in find_packages(root, &where_, &exclude, &include) {
                let mapped = mangle(package_dir, &dotted);
                record.packages_dict.insert(dotted, mapped);
            }
        }
        Packages::Explicit(names) => {
            for dotted in names {
                let mapped = mangle(package_dir, &dotted);
                record.packages_dict.insert(dotted, mapped);
            }
        }
        Packages::Unresolvable => {}
    }
}

/// Processes `packages_dict` by descending source-path length so the most
/// specific (longest) package wins when directories nest, then walks each
/// directory once recording any file not yet claimed by a longer entry.
fn materialize_source_mapping(record: &mut MetadataRecord, root: &Path) {
    let mut mapping: BTreeMap<String, String> = record
        .py_modules
        .iter()
        .map(|m| (format!("{m}.py"), format!("{m}.py")))
        .collect();

    let mut entries: Vec<(&String, &String)> = record.packages_dict.iter().collect();
    entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut claimed: std::collections::HashSet<String> = std::collections::HashSet::new();
    for (dotted, source_dir) in entries {
        let install_dir = dotted.replace('.', "/");
        let abs_dir = root.join(source_dir);
        if !abs_dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&abs_dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&abs_dir) else {
                continue;
            };
            let rel_posix = posix_components(rel);
            let source_key = format!("{source_dir}/{rel_posix}");
            if claimed.contains(&source_key) {
                continue;
            }
            claimed.insert(source_key.clone());
            mapping.insert(format!("{install_dir}/{rel_posix}"), source_key);
        }
    }

    record.source_mapping = Some(mapping);
}

fn posix_components(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_uses_longest_prefix() {
        let mut dir = BTreeMap::new();
        dir.insert(String::new(), ".".to_string());
        dir.insert("pkg".to_string(), "src/pkg".to_string());
        assert_eq!(mangle(&dir, "pkg"), "src/pkg");
        assert_eq!(mangle(&dir, "pkg.sub"), "src/pkg/sub");
        assert_eq!(mangle(&dir, "other"), "other");
    }

    #[test]
    fn mangle_root_remap_applies_to_everything() {
        let mut dir = BTreeMap::new();
        dir.insert(String::new(), "src".to_string());
        assert_eq!(mangle(&dir, "pkg"), "src/pkg");
        assert_eq!(mangle(&dir, "pkg.sub"), "src/pkg/sub");
    }

    #[test]
    fn pbr_compat_sets_discover_when_no_explicit_packages() {
        let mut record = MetadataRecord::new();
        record.pbr = Some(true);
        record.pbr_packages_root = Some("lib".to_string());
        record.pbr_packages = None;
        apply_pbr_compat(&mut record);
        assert_eq!(
            record.packages,
            Packages::Discover { where_: "lib".to_string(), exclude: vec![], include: vec!["*".to_string()] }
        );
        assert_eq!(record.package_dir, PackageDir::Map(BTreeMap::from([(String::new(), "lib".to_string())])));
    }

    #[test]
    fn overlay_project_urls_flattens_dict_to_label_equals_url() {
        let mut slot = Vec::new();
        let value = Value::Dict(vec![(
            Value::Str("Source".to_string()),
            Value::Str("https://example.com".to_string()),
        )]);
        overlay_project_urls(&mut slot, value);
        assert_eq!(slot, vec!["Source=https://example.com".to_string()]);
    }

    #[test]
    fn overlay_dict_of_lists_carries_entry_points() {
        let mut slot = BTreeMap::new();
        let value = Value::Dict(vec![(
            Value::Str("console_scripts".to_string()),
            Value::List(vec![Value::Str("foo = foo:main".to_string())]),
        )]);
        overlay_dict_of_lists(&mut slot, value);
        assert_eq!(slot.get("console_scripts"), Some(&vec!["foo = foo:main".to_string()]));
    }
}
