//! Safe member access, safe await, and `await` fan-out.
//!
//! A safe access chain folds into one guard ternary per safe link, so
//! `d?.e()?.f().g()` short-circuits the entire trailing chain: the guard
//! for the first link wraps everything after it in the alternative
//! branch. Guards compare with loose `== null`, matching both `null` and
//! `undefined`. A non-identifier base is hoisted into a declared
//! temporary and assigned inside the guard test, so it is evaluated
//! exactly once.

use lsc_ast::*;

use crate::factory as f;

/// How rules obtain synthesized identifiers from the orchestrator.
pub trait TempDecls {
    /// A collision-free name with no declaration attached (catch params,
    /// loop cursors that declare themselves).
    fn fresh(&mut self, hint: &str, span: Span) -> Ident;

    /// A collision-free name, pre-registered and declared (`let _x;`) at
    /// the top of the enclosing function, for values that must exist
    /// before the expression that assigns them.
    fn fresh_declared(&mut self, hint: &str, span: Span) -> Ident;
}

/// Does the leftmost spine of this expression (member objects, call
/// callees, tilde-call subjects) contain a safe member access?
pub fn spine_has_safe(expr: &Expr) -> bool {
    match expr {
        Expr::LsSafeMember(_) => true,
        Expr::Member(n) => spine_has_safe(&n.obj),
        Expr::Call(n) => spine_has_safe(&n.callee),
        Expr::LsTildeCall(n) => spine_has_safe(&n.left),
        _ => false,
    }
}

/// Fold every safe member on the spine of `expr` into guard ternaries,
/// innermost link first.
pub fn fold_safe_chain(expr: Expr, temps: &mut dyn TempDecls) -> Expr {
    if !spine_has_safe(&expr) {
        return expr;
    }
    let mut chain = expr;
    let (test_lhs, safe_span) = resolve_deepest(&mut chain, temps);
    let rest = fold_safe_chain(chain, temps);
    f::cond(
        f::bin(
            BinaryOp::EqEq,
            test_lhs,
            f::null(safe_span.collapse_to_end()),
            safe_span,
        ),
        f::null(safe_span),
        rest,
        safe_span,
    )
}

/// Recurse to the deepest safe member on the spine, replace it with a
/// plain member access off its (possibly hoisted) base, and return the
/// guard's left-hand side.
fn resolve_deepest(chain: &mut Expr, temps: &mut dyn TempDecls) -> (Expr, Span) {
    match chain {
        Expr::Member(n) if spine_has_safe(&n.obj) => resolve_deepest(&mut n.obj, temps),
        Expr::Call(n) if spine_has_safe(&n.callee) => resolve_deepest(&mut n.callee, temps),
        Expr::LsTildeCall(n) if spine_has_safe(&n.left) => resolve_deepest(&mut n.left, temps),
        Expr::LsSafeMember(n) if spine_has_safe(&n.obj) => resolve_deepest(&mut n.obj, temps),
        Expr::LsSafeMember(_) => {
            let taken = std::mem::replace(chain, f::null(Span::MISSING));
            let Expr::LsSafeMember(safe) = taken else {
                unreachable!("just matched a safe member");
            };
            let span = safe.span;

            // Reuse a bare identifier (or `this`) directly; hoist
            // anything else into a declared temporary assigned inside
            // the guard test, so the base is evaluated exactly once.
            let (test_lhs, base_ref) = match *safe.obj {
                Expr::Ident(id) => (f::ident_expr(f::clone_at(&id, span)), f::ident_expr(id)),
                Expr::This(t) => (Expr::This(t.clone()), Expr::This(t)),
                other => {
                    let temp = temps.fresh_declared("ref", other.span());
                    (
                        f::assign_ident(temp.clone(), other, span),
                        f::ident_expr(temp),
                    )
                }
            };

            *chain = Expr::Member(MemberExpr {
                span,
                obj: Box::new(base_ref),
                prop: safe.prop,
            });
            (test_lhs, span)
        }
        _ => unreachable!("resolve_deepest requires a safe member on the spine"),
    }
}

/// `x <!- expr` → `await (async () => { try { return await expr; }
/// catch (_err) { return _err; } })()`, the two-outcome await.
pub fn desugar_safe_await(node: LsSafeAwait, temps: &mut dyn TempDecls) -> Expr {
    let span = node.span;
    let arg_span = node.arg.span();
    let err = temps.fresh("err", span.collapse_to_end());

    let try_stmt = Stmt::Try(TryStmt {
        span,
        block: f::block(
            vec![f::return_stmt(
                Some(f::await_expr(*node.arg, arg_span)),
                arg_span,
            )],
            span,
        ),
        handler: Some(CatchClause {
            span: span.collapse_to_end(),
            param: Some(Pat::Ident(err.clone())),
            body: f::block(
                vec![f::return_stmt(
                    Some(f::ident_expr(f::clone_at(&err, span))),
                    span.collapse_to_end(),
                )],
                span.collapse_to_end(),
            ),
        }),
        finalizer: None,
    });

    f::await_expr(f::arrow_iife(vec![try_stmt], true, span), span)
}

/// `await [..]` / `await [for ...]` → `await Promise.all(...)`.
pub fn spread_await_over_array(node: &mut AwaitExpr) {
    if matches!(
        node.arg.as_ref(),
        Expr::Array(_) | Expr::LsArrayComprehension(_)
    ) {
        let span = node.arg.span();
        let arg = std::mem::replace(&mut *node.arg, f::null(Span::MISSING));
        *node.arg = f::method_call(
            f::ident_expr(f::ident("Promise", span.collapse_to_start())),
            "all",
            vec![arg],
            span,
        );
    }
}
