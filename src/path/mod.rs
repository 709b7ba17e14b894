//! The path-expression query language (spec.md §4.8/§4.9): a small
//! expression grammar for selecting and computing over nodes in a loaded
//! [`crate::document::Document`], compiled once and evaluated against a
//! document root the same way a compiled regex is evaluated against a
//! haystack.
//!
//! The `sibling` operator (a leading `:` in a path expression) is an
//! explicit non-goal: [`compiler::compile`] rejects it with
//! [`crate::error::PathCompileError::UnsupportedOperator`] rather than
//! silently misinterpreting it.

mod ast;
mod compiler;
mod eval;
mod lexer;

pub use ast::{ArithOp, CompareOp, Expr, ExprKind, Literal};
pub use eval::{Evaluator, ScalarValue, WalkResult};

use crate::document::Document;
use crate::error::{PathCompileError, PathEvalError};

/// A compiled path expression, ready to be evaluated against any number of
/// documents.
pub struct Path {
    expr: Expr,
}

impl Path {
    /// Compile a path expression's source text.
    pub fn compile(source: &str) -> Result<Path, PathCompileError> {
        Ok(Path {
            expr: compiler::compile(source)?,
        })
    }

    /// Evaluate this path against a document, starting from its root node.
    pub fn eval(&self, document: &Document) -> Result<WalkResult, PathEvalError> {
        Evaluator::new(document).eval(&self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagnosticSink;
    use crate::input::Input;
    use crate::parser::Parser;

    #[test]
    fn compiles_and_evaluates_end_to_end() {
        let mut parser = Parser::new(Input::from_str("t", "name: world\n"));
        let mut sink = DiagnosticSink::new();
        let doc = crate::loader::load(&mut parser, &mut sink).unwrap();

        let path = Path::compile("name").unwrap();
        let result = path.eval(&doc).unwrap();
        match result {
            WalkResult::Node(n) => {
                let crate::document::NodeData::Scalar { value, .. } = &doc.get_node(n).unwrap().data else {
                    panic!("expected scalar");
                };
                assert_eq!(value, "world");
            }
            other => panic!("expected node, got {other:?}"),
        }
    }

    #[test]
    fn rejects_sibling_operator() {
        assert_eq!(Path::compile(":x").unwrap_err(), PathCompileError::UnsupportedOperator);
    }
}
