//! Static abstract interpreter over a `setup.py`-shaped Python module.
//!
//! This never imports or executes the parsed source. It locates the
//! installer call, resolves each keyword argument against the module's
//! own assignments, and reports [`Value::Unresolvable`] wherever that
//! resolution cannot be done without running code.

pub mod analyzer;
pub mod eval;
pub mod imports;
pub mod scope;
pub mod value;

pub use analyzer::{analyze, AnalyzerError, CapturedArgs};
pub use value::Value;

use rustpython_parser::ast::Suite;
use rustpython_parser::parser::parse_program;

/// Parses `source` as a Python module. `path` is used only for error
/// messages.
pub fn parse_module(source: &str, path: &str) -> Result<Suite, rustpython_parser::ParseError> {
    parse_program(source, path)
}
