//! Fatal construct diagnostics.
//!
//! Every violation here aborts the compilation of the current program at
//! the point of detection; there is no partial output and nothing is
//! downgraded to a warning.

use lsc_ast::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("`{keyword}` is not allowed inside a comprehension body; apply it to the whole comprehension instead")]
    KeywordInComprehension { keyword: &'static str },

    #[error("an object comprehension tail must be a `(key, value)` pair")]
    ObjectComprehensionTail,

    #[error("a function declaration cannot be the tail of an object comprehension")]
    ObjectComprehensionFnTail,

    #[error("assignment to `{name}` cannot be the tail of {construct}; assign to a member, or end with the value itself")]
    TailIdentAssignment {
        name: String,
        construct: &'static str,
    },

    #[error("assignment to `{}`, which has no visible binding; visible bindings are: {}", .name, format_names(.visible))]
    AssignToUndeclared { name: String, visible: Vec<String> },

    #[error("reassignment to constant binding `{name}`")]
    AssignToConst { name: String },

    #[error("`{name}` shadows a binding in an enclosing scope; use `now {name} = ...` to reassign it or declare the new binding with an explicit `const`")]
    ImplicitShadow { name: String },

    #[error("cannot bind methods of a class whose constructor returns `super(...)` directly")]
    ReturnSuperWithBoundMethods,

    #[error("a branch of an `if` expression must be a single expression")]
    IfExpressionBranch,
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// A fatal diagnostic carrying the source position it was raised at.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{span}: {kind}")]
pub struct Diagnostic {
    pub span: Span,
    pub kind: ErrorKind,
}

impl Diagnostic {
    pub fn new(span: Span, kind: ErrorKind) -> Diagnostic {
        Diagnostic { span, kind }
    }
}

pub type Result<T> = std::result::Result<T, Diagnostic>;
