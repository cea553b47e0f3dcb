//! Tracks `import`/`from ... import ...` bindings so calls and names can be
//! resolved to a qualified name, the way `QualifiedNameProvider` does in
//! the `libcst`-based original. Only top-level imports are tracked, which
//! matches how setup.py is conventionally written.

use std::collections::HashMap;

use rustpython_parser::ast::{self, Expr, Stmt};

#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    /// local name -> fully qualified name, e.g. "setup" -> "setuptools.setup"
    bindings: HashMap<String, String>,
}

impl ImportMap {
    pub fn build(body: &[Stmt]) -> ImportMap {
        let mut map = ImportMap::default();
        for stmt in body {
            match stmt {
                ast::Stmt::Import(ast::StmtImport { names, .. }) => {
                    for alias in names {
                        let local = alias.asname.clone().unwrap_or_else(|| alias.name.clone());
                        map.bindings.insert(local.to_string(), alias.name.to_string());
                    }
                }
                ast::Stmt::ImportFrom(ast::StmtImportFrom { module, names, level, .. }) => {
                    // Relative imports (`level > 0` with no module) can't be
                    // resolved statically; skip them rather than guess.
                    let is_absolute = level.map(|l| l.to_u32()).unwrap_or(0) == 0;
                    let Some(module) = module.clone().filter(|_| is_absolute) else {
                        continue;
                    };
                    for alias in names {
                        let local = alias.asname.clone().unwrap_or_else(|| alias.name.clone());
                        map.bindings.insert(local.to_string(), format!("{module}.{}", alias.name));
                    }
                }
                _ => {}
            }
        }
        map
    }

    /// Resolves `name`, `module.name`, or a chain of attribute accesses
    /// rooted at an imported name, to its fully qualified form. Returns
    /// `None` when the root name was never imported (callers fall back to
    /// treating it as a builtin, e.g. bare `dict`).
    pub fn qualified_name(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Name(ast::ExprName { id, .. }) => self.bindings.get(id.as_str()).cloned(),
            Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
                let base = self.qualified_base(value)?;
                Some(format!("{base}.{attr}"))
            }
            _ => None,
        }
    }

    fn qualified_base(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Name(ast::ExprName { id, .. }) => Some(
                self.bindings
                    .get(id.as_str())
                    .cloned()
                    .unwrap_or_else(|| id.to_string()),
            ),
            Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
                let base = self.qualified_base(value)?;
                Some(format!("{base}.{attr}"))
            }
            _ => None,
        }
    }
}
