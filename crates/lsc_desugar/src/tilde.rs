//! Tilde calls: `a ~ f(b, c)` → `f(a, b, c)`.
//!
//! Pure argument reordering. Runs on traversal exit so that safe
//! navigation anywhere in the subject has already settled into its guard
//! ternary by the time the call is rebuilt.

use lsc_ast::*;

pub fn desugar_tilde_call(node: LsTildeCall) -> Expr {
    let mut args = Vec::with_capacity(node.args.len() + 1);
    args.push(ExprOrSpread {
        spread: false,
        expr: node.left,
    });
    args.extend(node.args);
    Expr::Call(CallExpr {
        span: node.span,
        callee: node.callee,
        args,
    })
}
