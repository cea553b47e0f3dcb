//! Locates the installer call in a parsed module and captures its keyword
//! arguments, evaluated against the module's static scope.

use std::collections::HashMap;

use rustpython_parser::ast::{self, Expr, Ranged, Stmt};
use thiserror::Error;
use tracing::warn;

use crate::eval::evaluate;
use crate::imports::ImportMap;
use crate::scope::Scope;
use crate::value::Value;

/// The entry points recognized as "the" installer call, in the order the
/// legacy backend accepts them: the modern `setuptools` re-export, the
/// older `distutils` location, and the generic alias some vendored
/// copies of distutils exposed under.
const INSTALLER_ENTRY_POINTS: &[&str] =
    &["setuptools.setup", "distutils.core.setup", "setup3lib"];

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("no recognized installer call found in setup.py")]
    NoInstallerCall,
}

/// The keyword arguments captured from the installer call, already
/// evaluated against the module's scope.
#[derive(Debug, Clone, Default)]
pub struct CapturedArgs {
    pub values: HashMap<String, Value>,
}

impl CapturedArgs {
    pub fn get(&self, keyword: &str) -> Value {
        self.values.get(keyword).cloned().unwrap_or(Value::Unresolvable)
    }
}

pub fn analyze(body: &[Stmt]) -> Result<CapturedArgs, AnalyzerError> {
    let imports = ImportMap::build(body);
    let scope = Scope::build(body);

    let call = find_installer_call(body, &imports).ok_or(AnalyzerError::NoInstallerCall)?;
    let Expr::Call(ast::ExprCall { args, keywords, .. }) = call else {
        unreachable!("find_installer_call only returns Call nodes");
    };

    if !args.is_empty() {
        warn!(
            count = args.len(),
            "installer call has positional arguments, which are not supported and are ignored"
        );
    }

    let call_line = usize::from(call.start());
    let mut captured = CapturedArgs::default();
    for kw in keywords {
        match &kw.arg {
            Some(name) => {
                let value = evaluate(&kw.value, &scope, &imports, call_line);
                captured.values.insert(name.to_string(), value);
            }
            None => {
                // `**kwargs`: fold in only if it resolves to a mapping.
                let value = evaluate(&kw.value, &scope, &imports, call_line);
                if let Value::Dict(entries) = value {
                    for (k, v) in entries {
                        if let Value::Str(key) = k {
                            captured.values.insert(key, v);
                        }
                    }
                } else {
                    warn!("double-starred installer argument did not resolve to a mapping");
                }
            }
        }
    }

    Ok(captured)
}

/// Walks statements in source order looking for the first `Call` whose
/// qualified name matches a recognized entry point. Once found, its own
/// arguments are not searched further, so a `setup()` call nested inside
/// another call's arguments is never mistaken for the subject.
fn find_installer_call<'a>(body: &'a [Stmt], imports: &ImportMap) -> Option<&'a Expr> {
    for stmt in body {
        if let Some(root) = expr_root_of(stmt) {
            if let Some(call) = search_calls(root, imports) {
                return Some(call);
            }
        }
        if let Some(nested) = nested_bodies(stmt) {
            for block in nested {
                if let Some(call) = find_installer_call(block, imports) {
                    return Some(call);
                }
            }
        }
    }
    None
}

fn expr_root_of(stmt: &Stmt) -> Option<&Expr> {
    match stmt {
        Stmt::Expr(ast::StmtExpr { value, .. }) => Some(value),
        Stmt::Assign(ast::StmtAssign { value, .. }) => Some(value),
        Stmt::Return(ast::StmtReturn { value: Some(value), .. }) => Some(value),
        _ => None,
    }
}

fn nested_bodies(stmt: &Stmt) -> Option<Vec<&[Stmt]>> {
    match stmt {
        Stmt::If(ast::StmtIf { body, orelse, .. }) => Some(vec![body.as_slice(), orelse.as_slice()]),
        Stmt::With(ast::StmtWith { body, .. }) => Some(vec![body.as_slice()]),
        Stmt::Try(ast::StmtTry { body, orelse, finalbody, .. }) => {
            Some(vec![body.as_slice(), orelse.as_slice(), finalbody.as_slice()])
        }
        _ => None,
    }
}

/// Pre-order search for the first `Call` in `expr` whose qualified name is
/// a recognized entry point. Does not descend into a call's own arguments
/// once that call has been inspected (matched or not) — a `setup()` deep
/// inside an unrelated call's arguments is not the subject.
fn search_calls<'a>(expr: &'a Expr, imports: &ImportMap) -> Option<&'a Expr> {
    if let Expr::Call(ast::ExprCall { func, .. }) = expr {
        if let Some(qualified) = imports.qualified_name(func) {
            if INSTALLER_ENTRY_POINTS.contains(&qualified.as_str()) {
                return Some(expr);
            }
        }
        return None;
    }

    match expr {
        ast::Expr::BinOp(ast::ExprBinOp { left, right, .. }) => {
            search_calls(left, imports).or_else(|| search_calls(right, imports))
        }
        ast::Expr::Tuple(ast::ExprTuple { elts, .. }) | ast::Expr::List(ast::ExprList { elts, .. }) => {
            elts.iter().find_map(|e| search_calls(e, imports))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;
    use indoc::indoc;

    fn analyze_source(source: &str) -> CapturedArgs {
        let module = parse_module(source, "<test>").expect("valid python");
        analyze(&module).expect("installer call found")
    }

    #[test]
    fn resolves_name_through_one_indirection() {
        let captured = analyze_source(indoc! {r#"
            from setuptools import setup
            the_name = "foo"
            setup(name=the_name, install_requires=["abc"], setup_requires=["def"])
        "#});
        assert_eq!(captured.get("name"), Value::Str("foo".to_string()));
        assert_eq!(
            captured.get("install_requires"),
            Value::List(vec![Value::Str("abc".to_string())])
        );
    }

    #[test]
    fn augmented_assignment_and_binary_add() {
        let captured = analyze_source(indoc! {r#"
            from setuptools import setup

            name = "foo"
            name += "bar"
            version = "base"
            version = version + ".suffix"
            classifiers = ["123", "abc"]
            if True:
                classifiers = classifiers + ["xyz"]

            setup(name=name, version=version, classifiers=classifiers)
        "#});
        assert_eq!(captured.get("name"), Value::Str("foobar".to_string()));
        assert_eq!(captured.get("version"), Value::Str("base.suffix".to_string()));
        assert_eq!(
            captured.get("classifiers"),
            Value::List(vec![
                Value::Str("123".to_string()),
                Value::Str("abc".to_string()),
                Value::Str("xyz".to_string()),
            ])
        );
    }

    #[test]
    fn circular_reference_resolves_to_unresolvable() {
        let captured = analyze_source(indoc! {r#"
            from setuptools import setup

            foo = bar
            bar = version
            version = foo

            setup(name="foo", version=version)
        "#});
        assert_eq!(captured.get("name"), Value::Str("foo".to_string()));
        assert_eq!(captured.get("version"), Value::Unresolvable);
    }

    #[test]
    fn find_packages_call_captures_discover_variant() {
        let captured = analyze_source(indoc! {r#"
            from setuptools import setup, find_packages
            setup(
                package_dir={"": "src"},
                packages=find_packages("src", exclude=("pkg.sub",)),
            )
        "#});
        match captured.get("packages") {
            Value::Discover { where_, exclude, include } => {
                assert_eq!(*where_, Value::Str("src".to_string()));
                assert_eq!(*exclude, Value::Tuple(vec![Value::Str("pkg.sub".to_string())]));
                assert_eq!(*include, Value::Tuple(vec![Value::Str("*".to_string())]));
            }
            other => panic!("expected Discover, got {other:?}"),
        }
    }

    #[test]
    fn dict_kwargs_are_folded_into_captured_args() {
        let captured = analyze_source(indoc! {r#"
            import setuptools

            name = "foo"
            kwargs = dict(name=name, description="d")

            setuptools.setup(**kwargs)
        "#});
        assert_eq!(captured.get("name"), Value::Str("foo".to_string()));
        assert_eq!(captured.get("description"), Value::Str("d".to_string()));
    }

    #[test]
    fn mismatched_add_yields_unresolvable_not_a_crash() {
        let captured = analyze_source(indoc! {r#"
            from setuptools import setup
            a = "aaaa"
            p = ["a", "b", "c"]
            setup(name=a + "1111", packages=[] + p, classifiers=a + p)
        "#});
        assert_eq!(captured.get("name"), Value::Str("aaaa1111".to_string()));
        assert_eq!(
            captured.get("packages"),
            Value::List(vec![
                Value::Str("a".to_string()),
                Value::Str("b".to_string()),
                Value::Str("c".to_string()),
            ])
        );
        assert_eq!(captured.get("classifiers"), Value::Unresolvable);
    }

    #[test]
    fn missing_installer_call_is_an_error() {
        let module = parse_module("x = 1\n", "<test>").unwrap();
        assert!(matches!(analyze(&module), Err(AnalyzerError::NoInstallerCall)));
    }
}
