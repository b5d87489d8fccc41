//! Output consistency checker.
//!
//! A standalone verifier run over desugared trees, used by the harness
//! and `lsc check`, never in the rewrite hot path. It reports every
//! extension node kind, extension flag, or missing source position that
//! survived desugaring; a clean report is the contract the code
//! generator downstream relies on.

use lsc_ast::visit::{self, VisitMut};
use lsc_ast::*;

#[derive(Debug)]
struct CheckVisitor {
    problems: Vec<String>,
}

impl CheckVisitor {
    fn check_span(&mut self, what: NodeKind, span: Span) {
        if span.is_missing() {
            self.problems
                .push(format!("{what:?} has no source position"));
        }
    }
}

impl VisitMut for CheckVisitor {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        let kind = stmt.kind();
        if kind.is_extension() {
            self.problems
                .push(format!("{}: extension kind {kind:?} survived", stmt.span()));
            return;
        }
        self.check_span(kind, stmt.span());
        if let Stmt::VarDecl(decl) = stmt {
            if decl.implicit {
                self.problems
                    .push(format!("{}: implicit flag survived on VarDecl", decl.span));
            }
        }
        visit::walk_mut_stmt(self, stmt);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        let kind = expr.kind();
        if kind.is_extension() {
            self.problems
                .push(format!("{}: extension kind {kind:?} survived", expr.span()));
            return;
        }
        self.check_span(kind, expr.span());
        if let Expr::Object(lit) = expr {
            for prop in &lit.props {
                if let Prop::Method(m) = prop {
                    if m.bound {
                        self.problems
                            .push(format!("{}: bound flag survived on object method", m.span));
                    }
                }
            }
        }
        visit::walk_mut_expr(self, expr);
    }

    fn visit_mut_pat(&mut self, pat: &mut Pat) {
        self.check_span(pat.kind(), pat.span());
        visit::walk_mut_pat(self, pat);
    }

    fn visit_mut_class(&mut self, class: &mut Class) {
        for member in &class.body {
            match member {
                ClassMember::Method(m) if m.bound => {
                    self.problems
                        .push(format!("{}: bound flag survived on class method", m.span));
                }
                ClassMember::Constructor(c) if c.implicit => {
                    self.problems
                        .push(format!("{}: implicit flag survived on constructor", c.span));
                }
                _ => {}
            }
        }
        visit::walk_mut_class(self, class);
    }
}

/// Verify that a desugared program contains only standard kinds with
/// valid positions. Returns every problem found.
pub fn check_program(program: &mut Program) -> Result<(), Vec<String>> {
    let mut v = CheckVisitor {
        problems: Vec::new(),
    };
    v.visit_mut_program(program);
    if v.problems.is_empty() {
        Ok(())
    } else {
        Err(v.problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory as f;

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
    fn clean_standard_tree_passes() {
        let mut program = Program {
            span: sp(0),
            body: vec![f::expr_stmt(f::num(1.0, sp(0)))],
        };
        assert!(check_program(&mut program).is_ok());
    }

    #[test]
    fn surviving_extension_kind_is_reported() {
        let mut program = Program {
            span: sp(0),
            body: vec![f::expr_stmt(Expr::LsSafeAwait(LsSafeAwait {
                span: sp(0),
                arg: Box::new(f::num(1.0, sp(1))),
            }))],
        };
        let problems = check_program(&mut program).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("LsSafeAwait"));
    }

    #[test]
    fn missing_position_is_reported() {
        let mut program = Program {
            span: sp(0),
            body: vec![f::expr_stmt(f::num(1.0, Span::MISSING))],
        };
        let problems = check_program(&mut program).unwrap_err();
        assert!(problems.iter().any(|p| p.contains("no source position")));
    }
}
