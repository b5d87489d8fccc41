//! Pattern matching: guarded `if`/`else if` chains with destructuring.
//!
//! Each alternative contributes a guard built from two parts, ANDed:
//! value checks (`x === 1 || x === 2`) and a property-existence test for
//! its `with` pattern. Property presence goes through one synthesized
//! `_hasProps(obj, props)` helper prepended to the program; the required
//! keys of a pattern are exactly those without defaults, nested patterns
//! recurse along the access path, and a pattern-level default `= e`
//! turns its guard into `(guard(path) || guard(e))`. Array patterns test
//! index keys (`"0"`, `"2"`); holes and rest elements are never
//! required, so defaults still apply when a key is absent.
//!
//! A guarded alternative opens with a real destructuring declaration of
//! the discriminant, then the clause body. In statement position the
//! chain is emitted inline; in expression position it is wrapped in an
//! IIFE whose clause tails become returns via the implicit-return pass.

use lsc_ast::*;

use crate::factory as f;
use crate::safe::TempDecls;

/// Orchestrator services the match rule needs on top of temporaries.
pub trait MatchCtx: TempDecls {
    /// Identifier of the `_hasProps` helper; requesting it marks the
    /// helper for injection at the top of the program.
    fn has_props(&mut self) -> Ident;
}

fn and_all(mut guards: Vec<Expr>, span: Span) -> Option<Expr> {
    let first = if guards.is_empty() {
        return None;
    } else {
        guards.remove(0)
    };
    Some(
        guards
            .into_iter()
            .fold(first, |acc, g| f::bin(BinaryOp::LogicalAnd, acc, g, span)),
    )
}

fn or2(a: Expr, b: Expr, span: Span) -> Expr {
    f::bin(BinaryOp::LogicalOr, a, b, span)
}

/// `_hasProps(<path>, ["a", "b"])`
fn has_props_call(ctx: &mut dyn MatchCtx, path: &Expr, keys: Vec<String>, span: Span) -> Expr {
    let helper = ctx.has_props();
    let keys = f::array(
        keys.into_iter().map(|k| f::str_expr(k, span)).collect(),
        span,
    );
    f::call(
        f::ident_expr(f::locate_at(helper, span)),
        vec![f::clone_at(path, span), keys],
        span,
    )
}

fn is_destructuring(pat: &Pat) -> bool {
    matches!(pat, Pat::Object(_) | Pat::Array(_) | Pat::Assign(_))
}

/// Append the existence guards for `pat`, matched against the value at
/// `path`, onto `out` in access order.
fn pattern_guards(ctx: &mut dyn MatchCtx, path: &Expr, pat: &Pat, out: &mut Vec<Expr>) {
    match pat {
        Pat::Object(obj) => {
            let span = obj.span;
            let mut required = Vec::new();
            for prop in &obj.props {
                match prop {
                    ObjectPatProp::Shorthand(s) => {
                        if s.default.is_none() {
                            required.push(s.key.sym.clone());
                        }
                    }
                    ObjectPatProp::KeyValue(kv) => {
                        if !matches!(kv.value.as_ref(), Pat::Assign(_)) {
                            required.push(kv.key.sym.clone());
                        }
                    }
                    ObjectPatProp::Rest(_) => {}
                }
            }
            out.push(has_props_call(ctx, path, required, span));
            for prop in &obj.props {
                if let ObjectPatProp::KeyValue(kv) = prop {
                    let sub_path = f::member(
                        f::clone_at(path, kv.key.span),
                        f::clone_at(&kv.key, kv.key.span),
                    );
                    nested_guards(ctx, &sub_path, &kv.value, out);
                }
            }
        }
        Pat::Array(arr) => {
            let span = arr.span;
            let mut required = Vec::new();
            for (i, elem) in arr.elems.iter().enumerate() {
                if let Some(pat) = elem {
                    if !matches!(pat, Pat::Assign(_) | Pat::Rest(_)) {
                        required.push(i.to_string());
                    }
                }
            }
            out.push(has_props_call(ctx, path, required, span));
            for (i, elem) in arr.elems.iter().enumerate() {
                if let Some(pat) = elem {
                    let elem_span = pat.span();
                    let sub_path =
                        f::computed_member(f::clone_at(path, elem_span), f::num(i as f64, elem_span));
                    nested_guards(ctx, &sub_path, pat, out);
                }
            }
        }
        Pat::Assign(assign) => {
            // Pattern-level default: the guard holds against the path
            // or against the default value.
            defaulted_guards(ctx, path, &assign.left, &assign.right, out);
        }
        Pat::Ident(_) | Pat::Rest(_) => {}
    }
}

/// Guards for a sub-pattern one step down the access path.
fn nested_guards(ctx: &mut dyn MatchCtx, sub_path: &Expr, pat: &Pat, out: &mut Vec<Expr>) {
    match pat {
        Pat::Object(_) | Pat::Array(_) => pattern_guards(ctx, sub_path, pat, out),
        Pat::Assign(assign) => defaulted_guards(ctx, sub_path, &assign.left, &assign.right, out),
        Pat::Ident(_) | Pat::Rest(_) => {}
    }
}

fn defaulted_guards(
    ctx: &mut dyn MatchCtx,
    path: &Expr,
    inner: &Pat,
    default: &Expr,
    out: &mut Vec<Expr>,
) {
    if !is_destructuring(inner) {
        return;
    }
    let span = inner.span();
    let mut at_path = Vec::new();
    pattern_guards(ctx, path, inner, &mut at_path);
    let mut at_default = Vec::new();
    pattern_guards(ctx, default, inner, &mut at_default);
    match (and_all(at_path, span), and_all(at_default, span)) {
        (Some(a), Some(b)) => out.push(or2(a, b, span)),
        (Some(a), None) => out.push(a),
        (None, Some(b)) => out.push(b),
        (None, None) => {}
    }
}

/// The complete guard for one alternative, or `None` for an arm that
/// always matches (a bare binding pattern with no value checks).
fn arm_guard(ctx: &mut dyn MatchCtx, disc: &Expr, arm: &LsMatchArm) -> Option<Expr> {
    let span = arm.span;
    let tests = arm
        .tests
        .iter()
        .map(|test| {
            f::bin(
                BinaryOp::EqEqEq,
                f::clone_at(disc, test.span()),
                test.clone(),
                test.span(),
            )
        })
        .reduce(|acc, t| or2(acc, t, span));

    let pattern = arm.pattern.as_ref().and_then(|pat| {
        let mut guards = Vec::new();
        pattern_guards(ctx, disc, pat, &mut guards);
        and_all(guards, span)
    });

    match (tests, pattern) {
        (Some(t), Some(p)) => Some(f::bin(BinaryOp::LogicalAnd, t, p, span)),
        (Some(t), None) => Some(t),
        (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

/// Clause block: destructuring declaration (when the pattern binds
/// anything) followed by the body statements.
fn arm_block(disc: &Expr, arm: LsMatchArm) -> BlockStmt {
    let span = arm.span;
    let mut stmts = Vec::new();
    if let Some(pat) = arm.pattern {
        let mut names = Vec::new();
        pat.bound_names(&mut names);
        if !names.is_empty() {
            let pat_span = pat.span();
            stmts.push(Stmt::VarDecl(f::var_decl(
                VarDeclKind::Const,
                pat,
                Some(f::clone_at(disc, pat_span)),
                pat_span,
            )));
        }
    }
    match arm.body {
        BlockStmtOrExpr::Block(block) => stmts.extend(block.stmts),
        BlockStmtOrExpr::Expr(expr) => stmts.push(f::expr_stmt(*expr)),
    }
    BlockStmt { span, stmts }
}

/// The `if`/`else if` chain over all alternatives, or `None` for an
/// armless match.
fn build_chain(ctx: &mut dyn MatchCtx, disc: &Expr, arms: Vec<LsMatchArm>) -> Option<Stmt> {
    let mut chain: Option<Stmt> = None;
    for arm in arms.into_iter().rev() {
        let span = arm.span;
        let guard = arm_guard(ctx, disc, &arm);
        let block = arm_block(disc, arm);
        chain = Some(match guard {
            Some(test) => Stmt::If(IfStmt {
                span,
                test: Box::new(test),
                cons: Box::new(Stmt::Block(block)),
                alt: chain.map(Box::new),
            }),
            // An unconditional arm swallows everything after it.
            None => Stmt::Block(block),
        });
    }
    chain
}

/// Lowered form of one match: hoisting prelude plus the chain.
pub struct LoweredMatch {
    pub prelude: Vec<Stmt>,
    pub chain: Option<Stmt>,
}

fn lower(ctx: &mut dyn MatchCtx, node: LsMatchExpr) -> LoweredMatch {
    let mut prelude = Vec::new();
    let disc: Expr = match *node.discriminant {
        Expr::Ident(id) => f::ident_expr(id),
        other => {
            let span = other.span();
            let temp = ctx.fresh("disc", span);
            prelude.push(f::const_decl(temp.clone(), other, span));
            f::ident_expr(temp)
        }
    };
    let chain = build_chain(ctx, &disc, node.arms);
    LoweredMatch { prelude, chain }
}

/// Statement position: the chain is emitted inline; a non-identifier
/// discriminant hoists into the statements before it.
pub fn desugar_match_stmt(ctx: &mut dyn MatchCtx, node: LsMatchExpr) -> (Vec<Stmt>, Stmt) {
    let span = node.span;
    let lowered = lower(ctx, node);
    let chain = lowered
        .chain
        .unwrap_or(Stmt::Empty(EmptyStmt { span }));
    (lowered.prelude, chain)
}

/// Expression position: the chain runs inside an IIFE; clause tails
/// become returns when the implicit-return pass visits the synthesized
/// function. Inside an `async` function the wrapper is `async` and
/// immediately awaited so clause bodies may await.
pub fn desugar_match_expr(ctx: &mut dyn MatchCtx, node: LsMatchExpr, in_async_fn: bool) -> Expr {
    let span = node.span;
    let lowered = lower(ctx, node);
    let mut stmts = lowered.prelude;
    if let Some(chain) = lowered.chain {
        stmts.push(chain);
    }
    let iife = f::arrow_iife(stmts, in_async_fn, span);
    if in_async_fn {
        f::await_expr(iife, span)
    } else {
        iife
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        count: usize,
        helper_requested: bool,
    }

    impl Ctx {
        fn new() -> Ctx {
            Ctx {
                count: 0,
                helper_requested: false,
            }
        }
    }

    impl TempDecls for Ctx {
        fn fresh(&mut self, hint: &str, span: Span) -> Ident {
            self.count += 1;
            f::ident(format!("_{hint}"), span)
        }
        fn fresh_declared(&mut self, hint: &str, span: Span) -> Ident {
            self.fresh(hint, span)
        }
    }

    impl MatchCtx for Ctx {
        fn has_props(&mut self) -> Ident {
            self.helper_requested = true;
            f::ident("_hasProps", Span::MISSING)
        }
    }

    fn sp(n: u32) -> Span {
        Span::new(
            n,
            n + 1,
            LineCol { line: 1, column: n },
            LineCol {
                line: 1,
                column: n + 1,
            },
        )
    }

    fn shorthand(key: &str, default: Option<Expr>) -> ObjectPatProp {
        ObjectPatProp::Shorthand(ShorthandPatProp {
            span: sp(0),
            key: f::ident(key, sp(0)),
            default: default.map(Box::new),
        })
    }

    fn obj_pat(props: Vec<ObjectPatProp>) -> Pat {
        Pat::Object(ObjectPat {
            span: sp(0),
            props,
        })
    }

    fn arm(tests: Vec<Expr>, pattern: Option<Pat>, body: Expr) -> LsMatchArm {
        LsMatchArm {
            span: sp(0),
            tests,
            pattern,
            body: BlockStmtOrExpr::Expr(Box::new(body)),
        }
    }

    fn match_node(arms: Vec<LsMatchArm>) -> LsMatchExpr {
        LsMatchExpr {
            span: sp(0),
            discriminant: Box::new(f::ident_expr(f::ident("x", sp(1)))),
            arms,
        }
    }

    /// Keys of a `_hasProps(path, [...])` call.
    fn has_props_keys(expr: &Expr) -> Vec<String> {
        let Expr::Call(call) = expr else {
            panic!("expected a _hasProps call, found {expr:?}")
        };
        assert_eq!(call.callee.as_ident().unwrap().sym, "_hasProps");
        let Expr::Array(arr) = call.args[1].expr.as_ref() else {
            panic!("expected the key array")
        };
        arr.elems
            .iter()
            .map(|e| {
                let Expr::Str(s) = e.expr.as_ref() else {
                    panic!("expected string keys")
                };
                s.value.clone()
            })
            .collect()
    }

    #[test]
    fn defaulted_keys_are_not_required() {
        // | with { a, b = 1 }: ...  →  guard _hasProps(x, ["a"])
        let mut ctx = Ctx::new();
        let pattern = obj_pat(vec![
            shorthand("a", None),
            shorthand("b", Some(f::num(1.0, sp(2)))),
        ]);
        let node = match_node(vec![arm(vec![], Some(pattern), f::num(0.0, sp(3)))]);
        let (_, chain) = desugar_match_stmt(&mut ctx, node);
        let Stmt::If(ifstmt) = chain else {
            panic!("expected the guard chain")
        };
        assert_eq!(has_props_keys(&ifstmt.test), vec!["a".to_string()]);
        assert!(ctx.helper_requested);
        // The clause opens with the destructuring declaration.
        let Stmt::Block(block) = *ifstmt.cons else {
            panic!("expected a clause block")
        };
        assert!(matches!(&block.stmts[0], Stmt::VarDecl(d) if d.kind == VarDeclKind::Const));
    }

    #[test]
    fn nested_patterns_guard_along_the_access_path() {
        // | with { a, b: { c } }:  →
        //   _hasProps(x, ["a", "b"]) && _hasProps(x.b, ["c"])
        let mut ctx = Ctx::new();
        let pattern = obj_pat(vec![
            shorthand("a", None),
            ObjectPatProp::KeyValue(KeyValuePatProp {
                span: sp(0),
                key: f::ident("b", sp(0)),
                value: Box::new(obj_pat(vec![shorthand("c", None)])),
            }),
        ]);
        let node = match_node(vec![arm(vec![], Some(pattern), f::num(0.0, sp(3)))]);
        let (_, chain) = desugar_match_stmt(&mut ctx, node);
        let Stmt::If(ifstmt) = chain else {
            panic!("expected the guard chain")
        };
        let Expr::Bin(and) = ifstmt.test.as_ref() else {
            panic!("expected ANDed guards")
        };
        assert_eq!(and.op, BinaryOp::LogicalAnd);
        assert_eq!(
            has_props_keys(&and.left),
            vec!["a".to_string(), "b".to_string()]
        );
        // Right side tests x.b for "c".
        let Expr::Call(nested) = and.right.as_ref() else {
            panic!("expected the nested guard")
        };
        let Expr::Member(path) = nested.args[0].expr.as_ref() else {
            panic!("expected the x.b path")
        };
        assert_eq!(path.obj.as_ident().unwrap().sym, "x");
        assert_eq!(has_props_keys(&and.right), vec!["c".to_string()]);
    }

    #[test]
    fn array_pattern_requires_index_keys_but_not_defaults() {
        // | [a, b = 4]:  → _hasProps(x, ["0"])
        // | [a, , b]:    → _hasProps(x, ["0", "2"])
        let mut ctx = Ctx::new();
        let with_default = Pat::Array(ArrayPat {
            span: sp(0),
            elems: vec![
                Some(Pat::Ident(f::ident("a", sp(1)))),
                Some(Pat::Assign(AssignPat {
                    span: sp(2),
                    left: Box::new(Pat::Ident(f::ident("b", sp(2)))),
                    right: Box::new(f::num(4.0, sp(3))),
                })),
            ],
        });
        let node = match_node(vec![arm(vec![], Some(with_default), f::num(0.0, sp(4)))]);
        let (_, chain) = desugar_match_stmt(&mut ctx, node);
        let Stmt::If(ifstmt) = chain else {
            panic!("expected the guard chain")
        };
        assert_eq!(has_props_keys(&ifstmt.test), vec!["0".to_string()]);

        let mut ctx = Ctx::new();
        let with_hole = Pat::Array(ArrayPat {
            span: sp(0),
            elems: vec![
                Some(Pat::Ident(f::ident("a", sp(1)))),
                None,
                Some(Pat::Ident(f::ident("b", sp(2)))),
            ],
        });
        let node = match_node(vec![arm(vec![], Some(with_hole), f::num(0.0, sp(4)))]);
        let (_, chain) = desugar_match_stmt(&mut ctx, node);
        let Stmt::If(ifstmt) = chain else {
            panic!("expected the guard chain")
        };
        assert_eq!(
            has_props_keys(&ifstmt.test),
            vec!["0".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn value_checks_or_chain_and_compose_with_patterns() {
        // | 1 or 2 with { a }:  → (x === 1 || x === 2) && _hasProps(x, ["a"])
        let mut ctx = Ctx::new();
        let node = match_node(vec![arm(
            vec![f::num(1.0, sp(2)), f::num(2.0, sp(3))],
            Some(obj_pat(vec![shorthand("a", None)])),
            f::num(0.0, sp(4)),
        )]);
        let (_, chain) = desugar_match_stmt(&mut ctx, node);
        let Stmt::If(ifstmt) = chain else {
            panic!("expected the guard chain")
        };
        let Expr::Bin(and) = ifstmt.test.as_ref() else {
            panic!("expected tests && pattern")
        };
        assert_eq!(and.op, BinaryOp::LogicalAnd);
        let Expr::Bin(or) = and.left.as_ref() else {
            panic!("expected or-chained tests")
        };
        assert_eq!(or.op, BinaryOp::LogicalOr);
        let Expr::Bin(eq) = or.left.as_ref() else {
            panic!("expected a strict comparison")
        };
        assert_eq!(eq.op, BinaryOp::EqEqEq);
    }

    #[test]
    fn arms_fall_through_in_order() {
        let mut ctx = Ctx::new();
        let node = match_node(vec![
            arm(vec![f::num(1.0, sp(2))], None, f::num(10.0, sp(3))),
            arm(vec![f::num(2.0, sp(4))], None, f::num(20.0, sp(5))),
        ]);
        let (_, chain) = desugar_match_stmt(&mut ctx, node);
        let Stmt::If(first) = chain else {
            panic!("expected the first guard")
        };
        let alt = first.alt.expect("second arm becomes the else branch");
        assert!(matches!(*alt, Stmt::If(_)));
    }

    #[test]
    fn computed_discriminant_is_hoisted_once() {
        let mut ctx = Ctx::new();
        let node = LsMatchExpr {
            span: sp(0),
            discriminant: Box::new(f::call(
                f::ident_expr(f::ident("g", sp(1))),
                vec![],
                sp(1),
            )),
            arms: vec![arm(vec![f::num(1.0, sp(2))], None, f::num(10.0, sp(3)))],
        };
        let (prelude, chain) = desugar_match_stmt(&mut ctx, node);
        assert_eq!(prelude.len(), 1);
        assert!(matches!(&prelude[0], Stmt::VarDecl(d) if d.kind == VarDeclKind::Const));
        let Stmt::If(ifstmt) = chain else {
            panic!("expected the guard chain")
        };
        let Expr::Bin(eq) = ifstmt.test.as_ref() else {
            panic!("expected a strict comparison")
        };
        assert_eq!(eq.left.as_ident().unwrap().sym, "_disc");
    }

    #[test]
    fn expression_form_wraps_in_an_iife() {
        let mut ctx = Ctx::new();
        let node = match_node(vec![arm(vec![f::num(1.0, sp(2))], None, f::num(10.0, sp(3)))]);
        let out = desugar_match_expr(&mut ctx, node, false);
        let Expr::Call(call) = out else {
            panic!("expected the invocation")
        };
        assert!(matches!(*call.callee, Expr::Arrow(_)));

        let mut ctx = Ctx::new();
        let node = match_node(vec![arm(vec![f::num(1.0, sp(2))], None, f::num(10.0, sp(3)))]);
        let out = desugar_match_expr(&mut ctx, node, true);
        assert!(matches!(out, Expr::Await(_)));
    }
}
