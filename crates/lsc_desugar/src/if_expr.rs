//! `if`-as-expression → ternary.
//!
//! Block-form branches must hold a single expression (or nothing, which
//! reads as `null`); a missing alternate becomes a `null` literal placed
//! immediately after the consequent so source maps have an anchor.

use lsc_ast::*;

use crate::diag::{Diagnostic, ErrorKind, Result};
use crate::factory as f;

fn branch_to_expr(branch: BlockStmtOrExpr) -> Result<Expr> {
    match branch {
        BlockStmtOrExpr::Expr(expr) => Ok(*expr),
        BlockStmtOrExpr::Block(block) => {
            let span = block.span;
            let mut stmts = block.stmts;
            match stmts.len() {
                0 => Ok(f::null(span)),
                1 => match stmts.pop().expect("length checked above") {
                    Stmt::Expr(es) => Ok(*es.expr),
                    other => Err(Diagnostic::new(other.span(), ErrorKind::IfExpressionBranch)),
                },
                _ => Err(Diagnostic::new(span, ErrorKind::IfExpressionBranch)),
            }
        }
    }
}

pub fn desugar_if_expr(node: LsIfExpr) -> Result<Expr> {
    let span = node.span;
    let cons = branch_to_expr(node.cons)?;
    let alt = match node.alt {
        Some(branch) => branch_to_expr(branch)?,
        None => f::locate_after(f::null(Span::MISSING), cons.span()),
    };
    Ok(f::cond(*node.test, cons, alt, span))
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn if_expr(cons: BlockStmtOrExpr, alt: Option<BlockStmtOrExpr>) -> LsIfExpr {
        LsIfExpr {
            span: sp(0),
            test: Box::new(f::ident_expr(f::ident("c", sp(1)))),
            cons,
            alt,
        }
    }

    #[test]
    fn expression_branches_become_a_ternary() {
        let node = if_expr(
            BlockStmtOrExpr::Expr(Box::new(f::num(1.0, sp(2)))),
            Some(BlockStmtOrExpr::Expr(Box::new(f::num(2.0, sp(3))))),
        );
        let Expr::Cond(cond) = desugar_if_expr(node).unwrap() else {
            panic!("expected a ternary")
        };
        assert!(matches!(*cond.cons, Expr::Num(_)));
        assert!(matches!(*cond.alt, Expr::Num(_)));
    }

    #[test]
    fn missing_alternate_is_null_placed_after_the_consequent() {
        let node = if_expr(BlockStmtOrExpr::Expr(Box::new(f::num(1.0, sp(2)))), None);
        let Expr::Cond(cond) = desugar_if_expr(node).unwrap() else {
            panic!("expected a ternary")
        };
        let Expr::Null(null) = *cond.alt else {
            panic!("expected a null alternate")
        };
        assert_eq!(null.span.start, sp(2).end);
        assert_eq!(null.span.end, sp(2).end);
    }

    #[test]
    fn single_statement_block_branch_unwraps() {
        let node = if_expr(
            BlockStmtOrExpr::Block(BlockStmt {
                span: sp(2),
                stmts: vec![f::expr_stmt(f::num(1.0, sp(2)))],
            }),
            None,
        );
        assert!(desugar_if_expr(node).is_ok());
    }

    #[test]
    fn multi_statement_branch_is_fatal() {
        let node = if_expr(
            BlockStmtOrExpr::Block(BlockStmt {
                span: sp(2),
                stmts: vec![
                    f::expr_stmt(f::num(1.0, sp(2))),
                    f::expr_stmt(f::num(2.0, sp(3))),
                ],
            }),
            None,
        );
        let err = desugar_if_expr(node).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IfExpressionBranch));
    }
}
