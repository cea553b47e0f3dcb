//! Builds the static scope table the evaluator resolves names against.
//!
//! This is a restatement of `libcst`'s `ScopeProvider` for the narrow
//! slice of Python this analyzer cares about: module-level name bindings,
//! including ones nested one level inside `if`/`with`/`try`/`for`/`while`
//! blocks (setup.py commonly guards a classifier or version tweak behind
//! `if sys.version_info >= ...:`). Function and class bodies introduce
//! their own scope and are not descended into, since `setup()` keyword
//! values never come from inside a nested `def`.

use std::collections::HashMap;

use rustpython_parser::ast::{self, Ranged, Stmt};

/// One binding of a name, in source order.
#[derive(Debug, Clone)]
pub enum Assignment {
    /// `name = <expr>`
    Plain(ast::Expr),
    /// `name += <expr>`
    Augmented(ast::Expr),
}

/// name -> every assignment to that name in the module, each tagged with
/// its source line. Not sorted; callers filter and order as needed.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Vec<(usize, Assignment)>>,
}

impl Scope {
    pub fn build(body: &[Stmt]) -> Scope {
        let mut scope = Scope::default();
        scope.walk(body);
        scope
    }

    fn walk(&mut self, body: &[Stmt]) {
        for stmt in body {
            let line = usize::from(stmt.start());
            match stmt {
                ast::Stmt::Assign(ast::StmtAssign { targets, value, .. }) => {
                    if let [target] = targets.as_slice() {
                        if let ast::Expr::Name(ast::ExprName { id, .. }) = target {
                            self.bindings
                                .entry(id.to_string())
                                .or_default()
                                .push((line, Assignment::Plain((**value).clone())));
                        }
                    }
                }
                ast::Stmt::AugAssign(ast::StmtAugAssign { target, value, .. }) => {
                    if let ast::Expr::Name(ast::ExprName { id, .. }) = target.as_ref() {
                        self.bindings
                            .entry(id.to_string())
                            .or_default()
                            .push((line, Assignment::Augmented((**value).clone())));
                    }
                }
                ast::Stmt::If(ast::StmtIf { body, orelse, .. }) => {
                    self.walk(body);
                    self.walk(orelse);
                }
                ast::Stmt::With(ast::StmtWith { body, .. }) => self.walk(body),
                ast::Stmt::For(ast::StmtFor { body, orelse, .. }) => {
                    self.walk(body);
                    self.walk(orelse);
                }
                ast::Stmt::While(ast::StmtWhile { body, orelse, .. }) => {
                    self.walk(body);
                    self.walk(orelse);
                }
                ast::Stmt::Try(ast::StmtTry { body, handlers, orelse, finalbody, .. }) => {
                    self.walk(body);
                    for handler in handlers {
                        let ast::ExceptHandler::ExceptHandler(ast::ExceptHandlerExceptHandler {
                            body,
                            ..
                        }) = handler;
                        self.walk(body);
                    }
                    self.walk(orelse);
                    self.walk(finalbody);
                }
                _ => {}
            }
        }
    }

    /// Every assignment to `name` with a strictly earlier source line than
    /// `before_line`, most recent first. This is the "last-write-wins"
    /// ordering the evaluator walks to resolve a name reference.
    pub fn assignments_before(&self, name: &str, before_line: usize) -> Vec<(usize, &Assignment)> {
        let mut found: Vec<(usize, &Assignment)> = self
            .bindings
            .get(name)
            .into_iter()
            .flatten()
            .filter(|(line, _)| *line < before_line)
            .map(|(line, a)| (*line, a))
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found
    }
}
