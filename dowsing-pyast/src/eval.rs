//! The total evaluator: `evaluate(node, scope, target_line) -> Value`.
//!
//! Never raises. Every case not explicitly handled here falls through to
//! `Value::Unresolvable`, and recursion past [`MAX_DEPTH`] does the same
//! rather than risking a stack overflow on adversarial nesting.

use rustpython_parser::ast::{self, Expr};

use crate::imports::ImportMap;
use crate::scope::{Assignment, Scope};
use crate::value::Value;

/// Recommended in the design notes: bounds evaluation depth independent of
/// how deeply the parser itself will nest expressions.
const MAX_DEPTH: usize = 256;

/// Qualified name of the whitelisted `dict(...)` builtin.
const DICT_BUILTIN: &str = "dict";
/// Qualified name of the package-discovery helper.
const FIND_PACKAGES: &str = "setuptools.find_packages";

pub fn evaluate(expr: &Expr, scope: &Scope, imports: &ImportMap, target_line: usize) -> Value {
    evaluate_inner(expr, scope, imports, target_line, 0)
}

fn evaluate_inner(
    expr: &Expr,
    scope: &Scope,
    imports: &ImportMap,
    target_line: usize,
    depth: usize,
) -> Value {
    if depth > MAX_DEPTH {
        return Value::Unresolvable;
    }

    match expr {
        Expr::Constant(ast::ExprConstant { value, .. }) => constant_to_value(value),
        Expr::Name(ast::ExprName { id, .. }) => match id.as_str() {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            "None" => Value::None,
            _ => resolve_name(id.as_str(), scope, imports, target_line, depth),
        },
        Expr::Tuple(ast::ExprTuple { elts, .. }) => Value::Tuple(
            elts.iter()
                .map(|e| evaluate_inner(e, scope, imports, target_line, depth + 1))
                .collect(),
        ),
        Expr::List(ast::ExprList { elts, .. }) => Value::List(
            elts.iter()
                .map(|e| evaluate_inner(e, scope, imports, target_line, depth + 1))
                .collect(),
        ),
        Expr::Dict(ast::ExprDict { keys, values, .. }) => {
            let mut entries = Vec::new();
            for (key, value) in keys.iter().zip(values.iter()) {
                if let Some(key) = key {
                    let k = evaluate_inner(key, scope, imports, target_line, depth + 1);
                    let v = evaluate_inner(value, scope, imports, target_line, depth + 1);
                    entries.push((k, v));
                }
                // `**other` entries (key == None) are not folded into dict
                // literals; only the whitelisted `dict(...)` call folds `**kwargs`.
            }
            Value::Dict(entries)
        }
        Expr::Subscript(ast::ExprSubscript { value, slice, .. }) => {
            let container = evaluate_inner(value, scope, imports, target_line, depth + 1);
            let index = evaluate_inner(slice, scope, imports, target_line, depth + 1);
            container.subscript(&index)
        }
        Expr::BinOp(ast::ExprBinOp { left, op, right, .. }) => {
            if matches!(op, ast::Operator::Add) {
                let l = evaluate_inner(left, scope, imports, target_line, depth + 1);
                let r = evaluate_inner(right, scope, imports, target_line, depth + 1);
                l.add(&r)
            } else {
                Value::Unresolvable
            }
        }
        Expr::Call(ast::ExprCall { func, args, keywords, .. }) => {
            evaluate_call(func, args, keywords, scope, imports, target_line, depth)
        }
        _ => Value::Unresolvable,
    }
}

fn constant_to_value(value: &ast::Constant) -> Value {
    match value {
        ast::Constant::Str(s) => Value::Str(s.clone()),
        ast::Constant::Bool(b) => Value::Bool(*b),
        ast::Constant::None => Value::None,
        ast::Constant::Int(i) => i
            .to_string()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Unresolvable),
        _ => Value::Unresolvable,
    }
}

/// Resolves a bare name by walking its assignments most-recent-first,
/// constrained to strictly before `target_line`. This is the rule that
/// makes `name = "x"; name += "y"` resolve and breaks reference cycles:
/// an assignment can only ever be explained by assignments that precede
/// it, so a name can never resolve back through itself.
fn resolve_name(
    name: &str,
    scope: &Scope,
    imports: &ImportMap,
    target_line: usize,
    depth: usize,
) -> Value {
    if depth > MAX_DEPTH {
        return Value::Unresolvable;
    }
    for (line, assignment) in scope.assignments_before(name, target_line) {
        let resolved = match assignment {
            Assignment::Plain(value_expr) => {
                evaluate_inner(value_expr, scope, imports, line, depth + 1)
            }
            Assignment::Augmented(value_expr) => {
                let previous = resolve_name(name, scope, imports, line, depth + 1);
                let delta = evaluate_inner(value_expr, scope, imports, line, depth + 1);
                previous.add(&delta)
            }
        };
        if !resolved.is_unresolvable() {
            return resolved;
        }
    }
    Value::Unresolvable
}

fn evaluate_call(
    func: &Expr,
    args: &[Expr],
    keywords: &[ast::Keyword],
    scope: &Scope,
    imports: &ImportMap,
    target_line: usize,
    depth: usize,
) -> Value {
    let qualified = imports.qualified_name(func);

    if qualified.as_deref() == Some(DICT_BUILTIN) || is_bare_name(func, DICT_BUILTIN) {
        let mut entries = Vec::new();
        for kw in keywords {
            if let Some(arg) = &kw.arg {
                let value = evaluate_inner(&kw.value, scope, imports, target_line, depth + 1);
                entries.push((Value::Str(arg.to_string()), value));
            }
            // `dict(**other)` is not folded; only named keyword args are captured.
        }
        return Value::Dict(entries);
    }

    if qualified.as_deref() == Some(FIND_PACKAGES) {
        let mut where_ = Value::Str(".".to_string());
        let mut exclude = Value::Tuple(vec![]);
        let mut include = Value::Tuple(vec![Value::Str("*".to_string())]);

        let positional_names = ["where", "exclude", "include"];
        for (i, arg) in args.iter().enumerate() {
            let value = evaluate_inner(arg, scope, imports, target_line, depth + 1);
            match positional_names.get(i) {
                Some(&"where") => where_ = value,
                Some(&"exclude") => exclude = value,
                Some(&"include") => include = value,
                _ => {}
            }
        }
        for kw in keywords {
            if let Some(arg) = &kw.arg {
                let value = evaluate_inner(&kw.value, scope, imports, target_line, depth + 1);
                match arg.as_str() {
                    "where" => where_ = value,
                    "exclude" => exclude = value,
                    "include" => include = value,
                    _ => {}
                }
            }
        }
        return Value::Discover {
            where_: Box::new(where_),
            exclude: Box::new(exclude),
            include: Box::new(include),
        };
    }

    Value::Unresolvable
}

fn is_bare_name(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Name(ast::ExprName { id, .. }) if id == name)
}
