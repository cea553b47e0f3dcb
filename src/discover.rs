//! Pure filesystem walk enumerating importable packages under a root,
//! filtered by dotted-name glob patterns.
//!
//! Known divergence from a strict reading of `exclude`/`include`: a
//! pattern is matched against each discovered dotted name independently.
//! Excluding `pkg.sub` drops `pkg.sub` from the result but does not stop
//! `pkg.sub.tests` from being walked and matched on its own — excludes
//! only drop the package whose own name matches, never its descendants.
//! This is documented, observed behavior of the tool being modeled, not a
//! bug to be fixed here.

use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

/// Enumerates every dotted package name under `root.join(where_)` that has
/// an `__init__.py`, filtered by `exclude`/`include` dotted-name glob
/// patterns (exclude wins; default include is `["*"]`). Returns
/// lexicographically sorted names so callers get deterministic output.
pub fn find_packages(root: &Path, where_: &str, exclude: &[String], include: &[String]) -> Vec<String> {
    let base = root.join(where_);
    if !base.is_dir() {
        return Vec::new();
    }

    let include_patterns: Vec<Regex> = if include.is_empty() {
        vec![glob_to_regex("*")]
    } else {
        include.iter().map(|p| glob_to_regex(p)).collect()
    };
    let exclude_patterns: Vec<Regex> = exclude.iter().map(|p| glob_to_regex(p)).collect();

    let mut found = Vec::new();
    for entry in WalkDir::new(&base).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() {
            continue;
        }
        if !entry.path().join("__init__.py").is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&base) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            // The root of `where_` itself is never a package name.
            continue;
        }
        let dotted = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".");

        let excluded = exclude_patterns.iter().any(|p| p.is_match(&dotted));
        let included = include_patterns.iter().any(|p| p.is_match(&dotted));
        if included && !excluded {
            found.push(dotted);
        }
    }
    found.sort();
    found
}

/// Translates a setuptools-style dotted-name glob (`*`, `?`) into an
/// anchored regex. `.` is treated literally; it is never a wildcard
/// separator the way it might be in a shell glob.
fn glob_to_regex(pattern: &str) -> Regex {
    let mut out = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    Regex::new(&out).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch_package(root: &Path, dotted: &str) {
        let dir = root.join(dotted.replace('.', "/"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
    }

    #[test]
    fn finds_nested_packages() {
        let tmp = TempDir::new().unwrap();
        touch_package(tmp.path(), "pkg");
        touch_package(tmp.path(), "pkg.sub");
        touch_package(tmp.path(), "pkg.tests");

        let found = find_packages(tmp.path(), ".", &[], &["*".to_string()]);
        assert_eq!(found, vec!["pkg", "pkg.sub", "pkg.tests"]);
    }

    #[test]
    fn exclude_does_not_drop_descendants() {
        let tmp = TempDir::new().unwrap();
        touch_package(tmp.path(), "pkg");
        touch_package(tmp.path(), "pkg.sub");
        touch_package(tmp.path(), "pkg.tests");

        let found = find_packages(tmp.path(), ".", &["pkg.sub".to_string()], &["*".to_string()]);
        assert_eq!(found, vec!["pkg", "pkg.tests"]);
    }

    #[test]
    fn where_rebases_discovery_root() {
        let tmp = TempDir::new().unwrap();
        touch_package(&tmp.path().join("src"), "pkg");

        let found = find_packages(tmp.path(), "src", &[], &["*".to_string()]);
        assert_eq!(found, vec!["pkg"]);
    }

    #[test]
    fn missing_where_yields_no_packages() {
        let tmp = TempDir::new().unwrap();
        let found = find_packages(tmp.path(), "does-not-exist", &[], &["*".to_string()]);
        assert!(found.is_empty());
    }
}
