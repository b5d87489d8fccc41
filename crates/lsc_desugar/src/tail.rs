//! Completion/tail analysis.
//!
//! Computes the statement positions that are "last to execute along some
//! control path" of a statement body, recursing into both `if` branches,
//! `try`/`catch`/`finally`, nested blocks, and (when the caller allows
//! it) loop bodies. The same walker *rewrites* those positions through a
//! [`TailAction`] strategy, which is how implicit returns and both
//! comprehension accumulators share one algorithm:
//!
//! - implicit return runs with loop bodies disallowed (a loop body runs
//!   repeatedly and cannot each be "the" return value),
//! - comprehension accumulation runs with loop bodies allowed (every
//!   iteration contributes a value).
//!
//! A tail that assigns to a plain identifier is rejected outright rather
//! than silently turning a mutation into a produced value; member and
//! index targets pass through as values.

use lsc_ast::*;

use crate::diag::{Diagnostic, ErrorKind, Result};

/// What to do with each tail position.
pub trait TailAction {
    /// Construct name used in diagnostics ("a comprehension", ...).
    fn construct(&self) -> &'static str;

    /// Replacement statements for a tail expression statement.
    fn on_expr(&mut self, expr: Expr, span: Span) -> Result<Vec<Stmt>>;

    /// Statements to insert *after* a function declaration in tail
    /// position (the declaration itself stays).
    fn on_fn_decl(&mut self, ident: &Ident, span: Span) -> Result<Vec<Stmt>>;
}

fn reject_ident_assignment(expr: &Expr, span: Span, construct: &'static str) -> Result<()> {
    if let Expr::Assign(assign) = expr {
        if let AssignTarget::Ident(id) = &assign.left {
            return Err(Diagnostic::new(
                span,
                ErrorKind::TailIdentAssignment {
                    name: id.sym.clone(),
                    construct,
                },
            ));
        }
    }
    Ok(())
}

/// Rewrite every tail position of `stmts`. Returns the number of tail
/// positions rewritten.
pub fn rewrite_tails(
    stmts: &mut Vec<Stmt>,
    allow_loops: bool,
    registry: &TypeRegistry,
    action: &mut dyn TailAction,
) -> Result<usize> {
    let Some(idx) = stmts.len().checked_sub(1) else {
        return Ok(0);
    };
    match &stmts[idx] {
        Stmt::Expr(es) => {
            reject_ident_assignment(&es.expr, es.span, action.construct())?;
            let span = es.span;
            let taken = std::mem::replace(&mut stmts[idx], Stmt::Empty(EmptyStmt { span }));
            let Stmt::Expr(es) = taken else { unreachable!() };
            let replacement = action.on_expr(*es.expr, span)?;
            stmts.splice(idx..idx + 1, replacement);
            Ok(1)
        }
        Stmt::FnDecl(decl) => {
            let after = action.on_fn_decl(&decl.ident, decl.span)?;
            stmts.extend(after);
            Ok(1)
        }
        _ => rewrite_tail_in_stmt(&mut stmts[idx], allow_loops, registry, action),
    }
}

/// Rewrite the tail positions inside a single statement slot. An
/// expression statement that expands to several statements is wrapped in
/// a block.
pub fn rewrite_tail_in_stmt(
    stmt: &mut Stmt,
    allow_loops: bool,
    registry: &TypeRegistry,
    action: &mut dyn TailAction,
) -> Result<usize> {
    match stmt {
        Stmt::Expr(es) => {
            reject_ident_assignment(&es.expr, es.span, action.construct())?;
            let span = es.span;
            let taken = std::mem::replace(stmt, Stmt::Empty(EmptyStmt { span }));
            let Stmt::Expr(es) = taken else { unreachable!() };
            let mut replacement = action.on_expr(*es.expr, span)?;
            *stmt = if replacement.len() == 1 {
                replacement.pop().expect("just checked the length")
            } else {
                Stmt::Block(BlockStmt {
                    span,
                    stmts: replacement,
                })
            };
            Ok(1)
        }
        Stmt::FnDecl(decl) => {
            let span = decl.span;
            let after = action.on_fn_decl(&decl.ident, span)?;
            if after.is_empty() {
                return Ok(1);
            }
            let taken = std::mem::replace(stmt, Stmt::Empty(EmptyStmt { span }));
            let mut stmts = vec![taken];
            stmts.extend(after);
            *stmt = Stmt::Block(BlockStmt { span, stmts });
            Ok(1)
        }
        Stmt::Block(block) => rewrite_tails(&mut block.stmts, allow_loops, registry, action),
        Stmt::If(ifstmt) => {
            let mut count = rewrite_tail_in_stmt(&mut ifstmt.cons, allow_loops, registry, action)?;
            if let Some(alt) = &mut ifstmt.alt {
                count += rewrite_tail_in_stmt(alt, allow_loops, registry, action)?;
            }
            Ok(count)
        }
        Stmt::Try(t) => {
            let mut count = rewrite_tails(&mut t.block.stmts, allow_loops, registry, action)?;
            if let Some(handler) = &mut t.handler {
                count += rewrite_tails(&mut handler.body.stmts, allow_loops, registry, action)?;
            }
            if let Some(finalizer) = &mut t.finalizer {
                count += rewrite_tails(&mut finalizer.stmts, allow_loops, registry, action)?;
            }
            Ok(count)
        }
        _ if registry.is_loop(stmt.kind()) => {
            if !allow_loops {
                return Ok(0);
            }
            let body = match stmt {
                Stmt::For(n) => &mut n.body,
                Stmt::ForIn(n) => &mut n.body,
                Stmt::ForOf(n) => &mut n.body,
                Stmt::While(n) => &mut n.body,
                Stmt::DoWhile(n) => &mut n.body,
                Stmt::LsRangeLoop(n) => &mut n.body,
                Stmt::LsArrayIter(n) => &mut n.body,
                Stmt::LsObjectIter(n) => &mut n.body,
                _ => return Ok(0),
            };
            rewrite_tail_in_stmt(body, allow_loops, registry, action)
        }
        _ => Ok(0),
    }
}

/// Read-only variant: the ordered spans of every tail position.
pub fn tail_spans(stmts: &[Stmt], allow_loops: bool, registry: &TypeRegistry) -> Vec<Span> {
    let mut out = Vec::new();
    if let Some(last) = stmts.last() {
        collect(last, allow_loops, registry, &mut out);
    }
    out
}

fn collect(stmt: &Stmt, allow_loops: bool, registry: &TypeRegistry, out: &mut Vec<Span>) {
    match stmt {
        Stmt::Expr(es) => out.push(es.span),
        Stmt::FnDecl(decl) => out.push(decl.span),
        Stmt::Block(block) => {
            if let Some(last) = block.stmts.last() {
                collect(last, allow_loops, registry, out);
            }
        }
        Stmt::If(ifstmt) => {
            collect(&ifstmt.cons, allow_loops, registry, out);
            if let Some(alt) = &ifstmt.alt {
                collect(alt, allow_loops, registry, out);
            }
        }
        Stmt::Try(t) => {
            if let Some(last) = t.block.stmts.last() {
                collect(last, allow_loops, registry, out);
            }
            if let Some(handler) = &t.handler {
                if let Some(last) = handler.body.stmts.last() {
                    collect(last, allow_loops, registry, out);
                }
            }
            if let Some(finalizer) = &t.finalizer {
                if let Some(last) = finalizer.stmts.last() {
                    collect(last, allow_loops, registry, out);
                }
            }
        }
        _ if registry.is_loop(stmt.kind()) => {
            if !allow_loops {
                return;
            }
            let body = match stmt {
                Stmt::For(n) => &n.body,
                Stmt::ForIn(n) => &n.body,
                Stmt::ForOf(n) => &n.body,
                Stmt::While(n) => &n.body,
                Stmt::DoWhile(n) => &n.body,
                Stmt::LsRangeLoop(n) => &n.body,
                Stmt::LsArrayIter(n) => &n.body,
                Stmt::LsObjectIter(n) => &n.body,
                _ => return,
            };
            collect(body, allow_loops, registry, out);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    struct ReturnTails;

    impl TailAction for ReturnTails {
        fn construct(&self) -> &'static str {
            "a function body"
        }
        fn on_expr(&mut self, expr: Expr, span: Span) -> Result<Vec<Stmt>> {
            Ok(vec![factory::return_stmt(Some(expr), span)])
        }
        fn on_fn_decl(&mut self, ident: &Ident, span: Span) -> Result<Vec<Stmt>> {
            Ok(vec![factory::return_stmt(
                Some(factory::ident_expr(ident.clone())),
                span,
            )])
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

    fn expr_of(name: &str, n: u32) -> Stmt {
        factory::expr_stmt(factory::ident_expr(factory::ident(name, sp(n))))
    }

    #[test]
    fn plain_block_tail_is_its_last_statement() {
        let registry = TypeRegistry::global();
        let mut stmts = vec![expr_of("a", 0), expr_of("b", 2)];
        let count = rewrite_tails(&mut stmts, false, registry, &mut ReturnTails).unwrap();
        assert_eq!(count, 1);
        assert!(matches!(stmts[0], Stmt::Expr(_)));
        assert!(matches!(&stmts[1], Stmt::Return(_)));
    }

    #[test]
    fn both_if_branches_are_tails() {
        let registry = TypeRegistry::global();
        let mut stmts = vec![Stmt::If(IfStmt {
            span: sp(0),
            test: Box::new(factory::ident_expr(factory::ident("c", sp(0)))),
            cons: Box::new(expr_of("a", 1)),
            alt: Some(Box::new(expr_of("b", 2))),
        })];
        let count = rewrite_tails(&mut stmts, false, registry, &mut ReturnTails).unwrap();
        assert_eq!(count, 2);
        let Stmt::If(ifstmt) = &stmts[0] else {
            panic!("expected the if to stay in place")
        };
        assert!(matches!(*ifstmt.cons, Stmt::Return(_)));
        assert!(matches!(**ifstmt.alt.as_ref().unwrap(), Stmt::Return(_)));
    }

    #[test]
    fn loop_bodies_are_tails_only_when_allowed() {
        let registry = TypeRegistry::global();
        let make = || {
            vec![Stmt::While(WhileStmt {
                span: sp(0),
                test: Box::new(factory::ident_expr(factory::ident("c", sp(0)))),
                body: Box::new(expr_of("a", 1)),
            })]
        };

        let mut disallowed = make();
        let count = rewrite_tails(&mut disallowed, false, registry, &mut ReturnTails).unwrap();
        assert_eq!(count, 0);

        let mut allowed = make();
        let count = rewrite_tails(&mut allowed, true, registry, &mut ReturnTails).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn tail_assignment_to_identifier_is_rejected() {
        let registry = TypeRegistry::global();
        let assign = factory::assign_ident(
            factory::ident("x", sp(0)),
            factory::num(1.0, sp(2)),
            sp(0),
        );
        let mut stmts = vec![factory::expr_stmt(assign)];
        let err = rewrite_tails(&mut stmts, false, registry, &mut ReturnTails).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::TailIdentAssignment { .. }
        ));
    }

    #[test]
    fn member_assignment_tail_is_a_value() {
        let registry = TypeRegistry::global();
        let member = MemberExpr {
            span: sp(0),
            obj: Box::new(factory::ident_expr(factory::ident("o", sp(0)))),
            prop: MemberProp::Ident(factory::ident("p", sp(1))),
        };
        let assign = factory::assign_member(member, factory::num(1.0, sp(3)), sp(0));
        let mut stmts = vec![factory::expr_stmt(assign)];
        let count = rewrite_tails(&mut stmts, false, registry, &mut ReturnTails).unwrap();
        assert_eq!(count, 1);
        assert!(matches!(&stmts[0], Stmt::Return(_)));
    }

    #[test]
    fn fn_decl_tail_returns_its_own_name() {
        let registry = TypeRegistry::global();
        let mut stmts = vec![Stmt::FnDecl(FnDecl {
            span: sp(0),
            ident: factory::ident("g", sp(0)),
            function: Function {
                span: sp(0),
                params: vec![],
                body: BlockStmt {
                    span: sp(0),
                    stmts: vec![],
                },
                is_async: false,
                is_generator: false,
                return_type: None,
            },
        })];
        rewrite_tails(&mut stmts, false, registry, &mut ReturnTails).unwrap();
        assert_eq!(stmts.len(), 2);
        let Stmt::Return(ret) = &stmts[1] else {
            panic!("expected a return after the declaration")
        };
        let arg = ret.arg.as_ref().unwrap();
        assert_eq!(arg.as_ident().unwrap().sym, "g");
    }

    #[test]
    fn tail_spans_recurse_try_blocks() {
        let registry = TypeRegistry::global();
        let stmts = vec![Stmt::Try(TryStmt {
            span: sp(0),
            block: BlockStmt {
                span: sp(0),
                stmts: vec![expr_of("a", 1)],
            },
            handler: Some(CatchClause {
                span: sp(2),
                param: None,
                body: BlockStmt {
                    span: sp(2),
                    stmts: vec![expr_of("b", 3)],
                },
            }),
            finalizer: Some(BlockStmt {
                span: sp(4),
                stmts: vec![expr_of("c", 5)],
            }),
        })];
        let spans = tail_spans(&stmts, false, registry);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].start, 1);
        assert_eq!(spans[1].start, 3);
        assert_eq!(spans[2].start, 5);
    }
}
