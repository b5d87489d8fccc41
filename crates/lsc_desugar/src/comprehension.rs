//! Array and object comprehensions.
//!
//! A comprehension becomes an immediately-invoked arrow function that
//! declares an accumulator, runs the (still sugared) loop with every
//! tail position rewritten into an accumulation, and returns the
//! accumulator. The loop itself is desugared when the traversal descends
//! into the synthesized body, and the wrapper is marked `async` when the
//! comprehension sits inside an `async` function.
//!
//! `yield`, `return` and `await` directly inside the loop body are fatal:
//! they would escape the synthesized function. `await` belongs on the
//! whole comprehension instead.

use lsc_ast::*;

use crate::diag::{Diagnostic, ErrorKind, Result};
use crate::factory as f;
use crate::scope::ScopeStack;
use crate::tail::{self, TailAction};

struct PushAction {
    acc: Ident,
}

impl TailAction for PushAction {
    fn construct(&self) -> &'static str {
        "a comprehension"
    }

    fn on_expr(&mut self, expr: Expr, span: Span) -> Result<Vec<Stmt>> {
        Ok(vec![f::expr_stmt(f::method_call(
            f::ident_expr(f::clone_at(&self.acc, span)),
            "push",
            vec![expr],
            span,
        ))])
    }

    fn on_fn_decl(&mut self, ident: &Ident, span: Span) -> Result<Vec<Stmt>> {
        Ok(vec![f::expr_stmt(f::method_call(
            f::ident_expr(f::clone_at(&self.acc, span)),
            "push",
            vec![f::ident_expr(f::clone_at(ident, span))],
            span,
        ))])
    }
}

struct KeyedInsertAction {
    acc: Ident,
}

impl TailAction for KeyedInsertAction {
    fn construct(&self) -> &'static str {
        "an object comprehension"
    }

    fn on_expr(&mut self, expr: Expr, span: Span) -> Result<Vec<Stmt>> {
        // The tail value must be exactly a `(key, value)` pair.
        let Expr::Seq(seq) = expr else {
            return Err(Diagnostic::new(span, ErrorKind::ObjectComprehensionTail));
        };
        if seq.exprs.len() != 2 {
            return Err(Diagnostic::new(seq.span, ErrorKind::ObjectComprehensionTail));
        }
        let mut exprs = seq.exprs.into_iter();
        let key = exprs.next().expect("length checked above");
        let value = exprs.next().expect("length checked above");
        let target = f::computed_member(f::ident_expr(f::clone_at(&self.acc, span)), key);
        let Expr::Member(member) = target else {
            unreachable!("computed_member builds a member expression")
        };
        Ok(vec![f::expr_stmt(f::assign_member(member, value, span))])
    }

    fn on_fn_decl(&mut self, _ident: &Ident, span: Span) -> Result<Vec<Stmt>> {
        Err(Diagnostic::new(span, ErrorKind::ObjectComprehensionFnTail))
    }
}

/// Reject `yield` / `return` / `await` directly inside a comprehension
/// loop body. Function bodies (including nested comprehensions, which
/// become functions) are opaque.
fn check_forbidden(stmt: &Stmt) -> Result<()> {
    fn fail(span: Span, keyword: &'static str) -> Result<()> {
        Err(Diagnostic::new(
            span,
            ErrorKind::KeywordInComprehension { keyword },
        ))
    }

    fn in_stmt(stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Return(ret) => fail(ret.span, "return"),
            Stmt::Expr(es) => in_expr(&es.expr),
            Stmt::Block(b) => b.stmts.iter().try_for_each(in_stmt),
            Stmt::VarDecl(decl) => decl
                .decls
                .iter()
                .filter_map(|d| d.init.as_deref())
                .try_for_each(in_expr),
            Stmt::If(n) => {
                in_expr(&n.test)?;
                in_stmt(&n.cons)?;
                n.alt.as_deref().map(in_stmt).unwrap_or(Ok(()))
            }
            Stmt::For(n) => {
                match &n.init {
                    Some(VarDeclOrExpr::Expr(e)) => in_expr(e)?,
                    Some(VarDeclOrExpr::VarDecl(decl)) => {
                        for d in &decl.decls {
                            if let Some(init) = &d.init {
                                in_expr(init)?;
                            }
                        }
                    }
                    None => {}
                }
                if let Some(test) = &n.test {
                    in_expr(test)?;
                }
                if let Some(update) = &n.update {
                    in_expr(update)?;
                }
                in_stmt(&n.body)
            }
            Stmt::ForIn(n) => in_expr(&n.right).and_then(|()| in_stmt(&n.body)),
            Stmt::ForOf(n) => in_expr(&n.right).and_then(|()| in_stmt(&n.body)),
            Stmt::While(n) => in_expr(&n.test).and_then(|()| in_stmt(&n.body)),
            Stmt::DoWhile(n) => in_stmt(&n.body).and_then(|()| in_expr(&n.test)),
            Stmt::Try(n) => {
                n.block.stmts.iter().try_for_each(in_stmt)?;
                if let Some(handler) = &n.handler {
                    handler.body.stmts.iter().try_for_each(in_stmt)?;
                }
                if let Some(finalizer) = &n.finalizer {
                    finalizer.stmts.iter().try_for_each(in_stmt)?;
                }
                Ok(())
            }
            Stmt::Throw(n) => in_expr(&n.arg),
            Stmt::LsRangeLoop(n) => {
                in_expr(&n.start)?;
                in_expr(&n.end)?;
                in_stmt(&n.body)
            }
            Stmt::LsArrayIter(n) => in_expr(&n.array).and_then(|()| in_stmt(&n.body)),
            Stmt::LsObjectIter(n) => in_expr(&n.object).and_then(|()| in_stmt(&n.body)),
            _ => Ok(()),
        }
    }

    fn in_expr(expr: &Expr) -> Result<()> {
        match expr {
            Expr::Yield(n) => fail(n.span, "yield"),
            Expr::Await(n) => fail(n.span, "await"),
            Expr::LsSafeAwait(n) => fail(n.span, "await"),
            // Function boundaries: whatever is inside stays inside, and a
            // nested comprehension becomes its own function.
            Expr::Fn(_)
            | Expr::Arrow(_)
            | Expr::Class(_)
            | Expr::LsNamedArrow(_)
            | Expr::LsArrow(_)
            | Expr::LsArrayComprehension(_)
            | Expr::LsObjectComprehension(_) => Ok(()),
            Expr::Array(n) => n.elems.iter().try_for_each(|e| in_expr(&e.expr)),
            Expr::Object(n) => n.props.iter().try_for_each(|p| match p {
                Prop::KeyValue(kv) => in_expr(&kv.value),
                Prop::Spread(s) => in_expr(&s.expr),
                Prop::Shorthand(_) | Prop::Method(_) => Ok(()),
            }),
            Expr::Call(n) => {
                in_expr(&n.callee)?;
                n.args.iter().try_for_each(|a| in_expr(&a.expr))
            }
            Expr::New(n) => {
                in_expr(&n.callee)?;
                n.args.iter().try_for_each(|a| in_expr(&a.expr))
            }
            Expr::Member(n) => {
                in_expr(&n.obj)?;
                match &n.prop {
                    MemberProp::Computed(e) => in_expr(e),
                    MemberProp::Ident(_) => Ok(()),
                }
            }
            Expr::Cond(n) => {
                in_expr(&n.test)?;
                in_expr(&n.cons)?;
                in_expr(&n.alt)
            }
            Expr::Assign(n) => in_expr(&n.right),
            Expr::Bin(n) => in_expr(&n.left).and_then(|()| in_expr(&n.right)),
            Expr::Unary(n) => in_expr(&n.arg),
            Expr::Update(n) => in_expr(&n.arg),
            Expr::Seq(n) => n.exprs.iter().try_for_each(in_expr),
            Expr::LsSafeMember(n) => in_expr(&n.obj),
            Expr::LsTildeCall(n) => {
                in_expr(&n.left)?;
                in_expr(&n.callee)?;
                n.args.iter().try_for_each(|a| in_expr(&a.expr))
            }
            Expr::LsIfExpr(n) => {
                in_expr(&n.test)?;
                in_block_or_expr(&n.cons)?;
                n.alt.as_ref().map(in_block_or_expr).unwrap_or(Ok(()))
            }
            Expr::LsMatch(n) => {
                in_expr(&n.discriminant)?;
                for arm in &n.arms {
                    arm.tests.iter().try_for_each(in_expr)?;
                    in_block_or_expr(&arm.body)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn in_block_or_expr(body: &BlockStmtOrExpr) -> Result<()> {
        match body {
            BlockStmtOrExpr::Block(b) => b.stmts.iter().try_for_each(in_stmt),
            BlockStmtOrExpr::Expr(e) => in_expr(e),
        }
    }

    in_stmt(stmt)
}

fn wrap_iife(
    acc: Ident,
    init: Expr,
    loop_stmt: Stmt,
    in_async_fn: bool,
    span: Span,
) -> Expr {
    let stmts = vec![
        f::const_decl(acc.clone(), init, span.collapse_to_start()),
        loop_stmt,
        f::return_stmt(Some(f::ident_expr(acc)), span.collapse_to_end()),
    ];
    f::arrow_iife(stmts, in_async_fn, span)
}

/// `[for ...: v]` → `(() => { const _arr = []; ...; return _arr; })()`
pub fn desugar_array_comprehension(
    node: LsArrayComprehension,
    scopes: &mut ScopeStack,
    registry: &TypeRegistry,
    in_async_fn: bool,
) -> Result<Expr> {
    check_forbidden(&node.loop_stmt)?;
    let span = node.span;
    let acc = f::ident(scopes.fresh("arr"), span.collapse_to_start());

    let mut loop_stmt = *node.loop_stmt;
    let mut action = PushAction { acc: acc.clone() };
    tail::rewrite_tail_in_stmt(&mut loop_stmt, true, registry, &mut action)?;

    Ok(wrap_iife(
        acc,
        f::array(vec![], span.collapse_to_start()),
        loop_stmt,
        in_async_fn,
        span,
    ))
}

/// `{for ...: (k, v)}` → `(() => { const _obj = {}; ...; return _obj; })()`
pub fn desugar_object_comprehension(
    node: LsObjectComprehension,
    scopes: &mut ScopeStack,
    registry: &TypeRegistry,
    in_async_fn: bool,
) -> Result<Expr> {
    check_forbidden(&node.loop_stmt)?;
    let span = node.span;
    let acc = f::ident(scopes.fresh("obj"), span.collapse_to_start());

    let mut loop_stmt = *node.loop_stmt;
    let mut action = KeyedInsertAction { acc: acc.clone() };
    tail::rewrite_tail_in_stmt(&mut loop_stmt, true, registry, &mut action)?;

    Ok(wrap_iife(
        acc,
        Expr::Object(ObjectLit {
            span: span.collapse_to_start(),
            props: vec![],
        }),
        loop_stmt,
        in_async_fn,
        span,
    ))
}
