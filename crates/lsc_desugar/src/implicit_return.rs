//! Implicit function returns.
//!
//! Runs on function exit, after every other rule has normalized the
//! body. Each tail expression becomes a `return` (both `if` branches,
//! try/catch/finally); a function declaration in tail position returns
//! its own name. When the body *ends* in a loop, the loop's tails
//! instead assign into one shared result variable, returned once after
//! the loop, never from the first iteration.

use lsc_ast::*;

use crate::diag::Result;
use crate::factory as f;
use crate::safe::TempDecls;
use crate::tail::{self, TailAction};

struct ReturnAction;

impl TailAction for ReturnAction {
    fn construct(&self) -> &'static str {
        "a function body"
    }

    fn on_expr(&mut self, expr: Expr, span: Span) -> Result<Vec<Stmt>> {
        // An explicit return/throw never reaches here; a tail that is
        // already a return is not an expression statement.
        Ok(vec![f::return_stmt(Some(expr), span)])
    }

    fn on_fn_decl(&mut self, ident: &Ident, span: Span) -> Result<Vec<Stmt>> {
        Ok(vec![f::return_stmt(
            Some(f::ident_expr(f::clone_at(ident, span))),
            span.collapse_to_end(),
        )])
    }
}

struct AccumulateAction {
    result: Ident,
}

impl TailAction for AccumulateAction {
    fn construct(&self) -> &'static str {
        "a function body"
    }

    fn on_expr(&mut self, expr: Expr, span: Span) -> Result<Vec<Stmt>> {
        Ok(vec![f::expr_stmt(f::assign_ident(
            f::clone_at(&self.result, span),
            expr,
            span,
        ))])
    }

    fn on_fn_decl(&mut self, ident: &Ident, span: Span) -> Result<Vec<Stmt>> {
        Ok(vec![f::expr_stmt(f::assign_ident(
            f::clone_at(&self.result, span),
            f::ident_expr(f::clone_at(ident, span)),
            span.collapse_to_end(),
        ))])
    }
}

/// Add implicit returns to a (fully desugared) function body.
pub fn apply(
    body: &mut BlockStmt,
    registry: &TypeRegistry,
    temps: &mut dyn TempDecls,
) -> Result<()> {
    let Some(last) = body.stmts.last() else {
        return Ok(());
    };

    if registry.is_loop(last.kind()) {
        let loop_span = last.span();
        let result = temps.fresh("result", loop_span.collapse_to_start());
        let mut action = AccumulateAction {
            result: result.clone(),
        };
        let idx = body.stmts.len() - 1;
        let count =
            tail::rewrite_tail_in_stmt(&mut body.stmts[idx], true, registry, &mut action)?;
        if count == 0 {
            return Ok(());
        }
        body.stmts
            .insert(idx, f::let_decl(result.clone(), None, loop_span.collapse_to_start()));
        body.stmts.push(f::return_stmt(
            Some(f::ident_expr(result)),
            loop_span.collapse_to_end(),
        ));
        return Ok(());
    }

    tail::rewrite_tails(&mut body.stmts, false, registry, &mut ReturnAction)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Temps(usize);

    impl TempDecls for Temps {
        fn fresh(&mut self, hint: &str, span: Span) -> Ident {
            self.0 += 1;
            f::ident(format!("_{hint}"), span)
        }
        fn fresh_declared(&mut self, hint: &str, span: Span) -> Ident {
            self.fresh(hint, span)
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

    #[test]
    fn trailing_expression_becomes_a_return() {
        let registry = TypeRegistry::global();
        let mut body = f::block(
            vec![f::expr_stmt(f::ident_expr(f::ident("x", sp(0))))],
            sp(0),
        );
        apply(&mut body, registry, &mut Temps(0)).unwrap();
        assert!(matches!(&body.stmts[0], Stmt::Return(_)));
    }

    #[test]
    fn both_branches_of_a_trailing_if_return() {
        let registry = TypeRegistry::global();
        let mut body = f::block(
            vec![Stmt::If(IfStmt {
                span: sp(0),
                test: Box::new(f::ident_expr(f::ident("c", sp(0)))),
                cons: Box::new(f::expr_stmt(f::num(1.0, sp(1)))),
                alt: Some(Box::new(f::expr_stmt(f::num(2.0, sp(2))))),
            })],
            sp(0),
        );
        apply(&mut body, registry, &mut Temps(0)).unwrap();
        let Stmt::If(ifstmt) = &body.stmts[0] else {
            panic!("expected the if to stay")
        };
        assert!(matches!(*ifstmt.cons, Stmt::Return(_)));
        assert!(matches!(**ifstmt.alt.as_ref().unwrap(), Stmt::Return(_)));
    }

    #[test]
    fn trailing_loop_accumulates_into_one_result() {
        let registry = TypeRegistry::global();
        let mut body = f::block(
            vec![Stmt::While(WhileStmt {
                span: sp(0),
                test: Box::new(f::ident_expr(f::ident("c", sp(0)))),
                body: Box::new(f::expr_stmt(f::ident_expr(f::ident("v", sp(1))))),
            })],
            sp(0),
        );
        apply(&mut body, registry, &mut Temps(0)).unwrap();
        // let _result; while (c) _result = v; return _result;
        assert_eq!(body.stmts.len(), 3);
        assert!(matches!(&body.stmts[0], Stmt::VarDecl(d) if d.kind == VarDeclKind::Let));
        let Stmt::While(while_stmt) = &body.stmts[1] else {
            panic!("expected the loop in the middle")
        };
        let Stmt::Expr(assign) = while_stmt.body.as_ref() else {
            panic!("expected the accumulating assignment")
        };
        assert!(matches!(assign.expr.as_ref(), Expr::Assign(_)));
        let Stmt::Return(ret) = &body.stmts[2] else {
            panic!("expected the single return after the loop")
        };
        assert_eq!(ret.arg.as_ref().unwrap().as_ident().unwrap().sym, "_result");
    }

    #[test]
    fn trailing_loop_without_tails_is_untouched() {
        let registry = TypeRegistry::global();
        let mut body = f::block(
            vec![Stmt::While(WhileStmt {
                span: sp(0),
                test: Box::new(f::ident_expr(f::ident("c", sp(0)))),
                body: Box::new(Stmt::Break(BreakStmt { span: sp(1) })),
            })],
            sp(0),
        );
        apply(&mut body, registry, &mut Temps(0)).unwrap();
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn existing_return_is_left_alone() {
        let registry = TypeRegistry::global();
        let mut body = f::block(
            vec![f::return_stmt(
                Some(f::ident_expr(f::ident("x", sp(0)))),
                sp(0),
            )],
            sp(0),
        );
        apply(&mut body, registry, &mut Temps(0)).unwrap();
        assert_eq!(body.stmts.len(), 1);
        assert!(matches!(&body.stmts[0], Stmt::Return(_)));
    }
}
