//! End-to-end scenarios against the library API, each exercising the full
//! dispatch → reader → layout pipeline over a real temporary source tree.

use std::path::Path;

use anyhow::Result;
use dowsing::{metadata, requires_for_build_sdist, requires_for_build_wheel, Packages};
use indoc::indoc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent).unwrap();
    }
    fs_err::write(path, contents).unwrap();
}

#[test]
fn ini_only_declares_build_requires_and_metadata() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "setup.cfg",
        indoc! {"
            [metadata]
            name = foo

            [options]
            install_requires = abc
            setup_requires = def
        "},
    );

    assert_eq!(requires_for_build_sdist(dir.path(), None)?, vec!["setuptools", "def"]);
    assert_eq!(requires_for_build_wheel(dir.path(), None)?, vec!["setuptools", "wheel", "def"]);

    let record = metadata(dir.path())?;
    assert_eq!(record.name, "foo");
    assert_eq!(record.requires_dist, vec!["abc".to_string()]);
    Ok(())
}

#[test]
fn script_name_resolution_matches_ini_only_scenario() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup
            the_name = "foo"
            setup(name=the_name, install_requires=["abc"], setup_requires=["def"])
        "#},
    );

    assert_eq!(requires_for_build_sdist(dir.path(), None)?, vec!["setuptools", "def"]);
    let record = metadata(dir.path())?;
    assert_eq!(record.name, "foo");
    assert_eq!(record.requires_dist, vec!["abc".to_string()]);
    Ok(())
}

#[test]
fn augmented_assignment_and_binary_add_resolve() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup

            name = "foo"
            name += "bar"
            version = "base"
            version = version + ".suffix"
            classifiers = ["123", "abc"]
            if True:
                classifiers = classifiers + ["xyz"]

            setup(name=name, version=version, classifiers=classifiers)
        "#},
    );

    let record = metadata(dir.path())?;
    assert_eq!(record.name, "foobar");
    assert_eq!(record.version, "base.suffix");
    assert_eq!(record.classifiers, vec!["123".to_string(), "abc".to_string(), "xyz".to_string()]);
    Ok(())
}

#[test]
fn circular_reference_is_unresolvable_and_omitted_from_json() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup

            foo = bar
            bar = version
            version = foo

            setup(name="foo", version=version)
        "#},
    );

    let record = metadata(dir.path())?;
    assert_eq!(record.name, "foo");
    assert_eq!(record.version, "");
    assert!(!record.as_dict().contains_key("version"));
    Ok(())
}

#[test]
fn package_discovery_with_src_layout_and_exclude() -> Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "src/pkg/__init__.py", "");
    write(dir.path(), "src/pkg/sub/__init__.py", "");
    write(dir.path(), "src/pkg/tests/__init__.py", "");
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup, find_packages
            setup(
                package_dir={"": "src"},
                packages=find_packages("src", exclude=("pkg.sub",)),
            )
        "#},
    );

    let record = metadata(dir.path())?;
    assert_eq!(record.packages_dict.get("pkg").map(String::as_str), Some("src/pkg"));
    assert_eq!(record.packages_dict.get("pkg.tests").map(String::as_str), Some("src/pkg/tests"));
    assert!(!record.packages_dict.contains_key("pkg.sub"));

    let mapping = record.source_mapping.expect("source mapping computed");
    assert_eq!(mapping.get("pkg/__init__.py").map(String::as_str), Some("src/pkg/__init__.py"));
    assert_eq!(
        mapping.get("pkg/tests/__init__.py").map(String::as_str),
        Some("src/pkg/tests/__init__.py")
    );
    Ok(())
}

#[test]
fn py_modules_map_to_themselves() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup
            setup(py_modules=["a", "b"])
        "#},
    );

    let record = metadata(dir.path())?;
    let mapping = record.source_mapping.expect("source mapping computed");
    assert_eq!(mapping.get("a.py").map(String::as_str), Some("a.py"));
    assert_eq!(mapping.get("b.py").map(String::as_str), Some("b.py"));
    Ok(())
}

#[test]
fn script_overrides_ini_only_when_truthy() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "setup.cfg",
        indoc! {"
            [metadata]
            name = from-ini
            version = 1.0.0
        "},
    );
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup
            setup(name="from-script", version=undefined_name)
        "#},
    );

    let record = metadata(dir.path())?;
    assert_eq!(record.name, "from-script");
    // `undefined_name` resolves to Unresolvable, which is falsey in the
    // override step, so the INI-provided version stands.
    assert_eq!(record.version, "1.0.0");
    Ok(())
}

#[test]
fn declarative_backend_is_reported_as_unsupported() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "pyproject.toml",
        indoc! {r#"
            [build-system]
            requires = ["flit_core>=3.2"]
            build-backend = "flit_core.buildapi"
        "#},
    );

    let err = metadata(dir.path()).unwrap_err();
    assert!(matches!(err, dowsing::DowsingError::UnsupportedBackend { .. }));
    Ok(())
}

#[test]
fn missing_installer_call_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "setup.py", "x = 1\n");

    let err = metadata(dir.path()).unwrap_err();
    assert!(matches!(err, dowsing::DowsingError::NoInstallerCall(_)));
    Ok(())
}

#[test]
fn pbr_compat_fires_without_explicit_packages() -> Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "lib/widget/__init__.py", "");
    write(
        dir.path(),
        "setup.cfg",
        indoc! {"
            [metadata]
            name = widget

            [files]
            packages_root = lib
        "},
    );
    write(
        dir.path(),
        "setup.py",
        indoc! {r#"
            from setuptools import setup
            setup(pbr=True)
        "#},
    );

    let record = metadata(dir.path())?;
    match record.packages {
        Packages::Discover { where_, .. } => assert_eq!(where_, "lib"),
        other => panic!("expected Discover, got {other:?}"),
    }
    assert_eq!(record.packages_dict.get("widget").map(String::as_str), Some("lib/widget"));
    Ok(())
}
