//! LightScript extension node kinds.
//!
//! These are the AST kinds the upstream parser produces beyond the
//! standard grammar. Every one of them is rewritten away by the
//! desugaring engine; none may survive into the output tree. Kind names
//! carry an `Ls` prefix to keep them visually distinct from the standard
//! vocabulary.

use serde::{Deserialize, Serialize};

use crate::ast::*;
use crate::span::Span;

/// `for i from 0 til 10` / `for from 0 upto 10`: counted range loop.
/// Without an `id` the engine synthesizes an index identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsRangeLoop {
    pub span: Span,
    #[serde(default)]
    pub id: Option<Ident>,
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    #[serde(default)]
    pub inclusive: bool,
    pub body: Box<Stmt>,
}

/// `for idx i in arr` / `for elem x in arr` / `for idx i, elem x in arr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsArrayIter {
    pub span: Span,
    #[serde(default)]
    pub idx: Option<Ident>,
    #[serde(default)]
    pub elem: Option<Ident>,
    pub array: Box<Expr>,
    pub body: Box<Stmt>,
}

/// `for key k in obj` / `for val v in obj` / `for key k, val v in obj`.
/// Iterates own keys only, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsObjectIter {
    pub span: Span,
    #[serde(default)]
    pub key: Option<Ident>,
    #[serde(default)]
    pub value: Option<Ident>,
    pub object: Box<Expr>,
    pub body: Box<Stmt>,
}

/// `[for elem x in arr: f(x)]`; the wrapped statement must be a loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsArrayComprehension {
    pub span: Span,
    #[serde(rename = "loop")]
    pub loop_stmt: Box<Stmt>,
}

/// `{for key k in obj: (k, obj[k])}`; tail values must be `(key, value)`
/// pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsObjectComprehension {
    pub span: Span,
    #[serde(rename = "loop")]
    pub loop_stmt: Box<Stmt>,
}

/// `a ~ f(b, c)`: infix call sugar, becomes `f(a, b, c)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsTildeCall {
    pub span: Span,
    pub left: Box<Expr>,
    pub callee: Box<Expr>,
    pub args: Vec<ExprOrSpread>,
}

/// Body and flags shared by the terse function forms (`->`, `=>`, `*->`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerseFunction {
    pub span: Span,
    pub params: Vec<Pat>,
    pub body: BlockStmtOrExpr,
    /// `->`: ordinary `this` binding. `=>` (false): lexical `this`.
    #[serde(default)]
    pub skinny: bool,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,
    #[serde(default)]
    pub return_type: Option<Ident>,
}

/// `f() -> body` in statement position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsNamedArrowDecl {
    pub span: Span,
    pub ident: Ident,
    pub function: TerseFunction,
}

/// `f() -> body` in expression position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsNamedArrowExpr {
    pub span: Span,
    pub ident: Ident,
    pub function: TerseFunction,
}

/// `obj.method() -> body` in statement position; assigns into the member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsMemberArrow {
    pub span: Span,
    pub target: MemberExpr,
    pub function: TerseFunction,
}

/// Anonymous terse function `(x) -> body` / `(x) => body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsArrowExpr {
    pub span: Span,
    pub function: TerseFunction,
}

/// `if`-as-expression; branches are single expressions (possibly written
/// in block form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsIfExpr {
    pub span: Span,
    pub test: Box<Expr>,
    pub cons: BlockStmtOrExpr,
    #[serde(default)]
    pub alt: Option<BlockStmtOrExpr>,
}

/// `a?.b` / `a?.[i]`: safe member access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsSafeMember {
    pub span: Span,
    pub obj: Box<Expr>,
    pub prop: MemberProp,
}

/// `x <!- expr`: await that yields the caught error instead of throwing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsSafeAwait {
    pub span: Span,
    pub arg: Box<Expr>,
}

/// One `| tests with pattern: body` alternative of a match expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsMatchArm {
    pub span: Span,
    /// Value checks, compared to the discriminant with `===`, or-chained.
    #[serde(default)]
    pub tests: Vec<Expr>,
    /// Destructuring pattern introduced by `with`.
    #[serde(default)]
    pub pattern: Option<Pat>,
    pub body: BlockStmtOrExpr,
}

/// `match x: | ...` pattern-matching expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsMatchExpr {
    pub span: Span,
    pub discriminant: Box<Expr>,
    pub arms: Vec<LsMatchArm>,
}

/// Feature flags controlling which syntax extensions the upstream parser
/// may produce. Opaque to the desugaring engine beyond being carried in
/// its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsSyntax {
    pub jsx: bool,
    pub types: bool,
}

impl Default for LsSyntax {
    fn default() -> Self {
        Self {
            jsx: false,
            types: true,
        }
    }
}
