//! Node factory.
//!
//! Every node a rewrite rule synthesizes is built here, with the source
//! span threaded through explicitly, so position provenance is enforced
//! in one place instead of per rule. The typed constructors make a
//! missing required field unrepresentable; a missing *position* is the
//! explicit [`Span::MISSING`] sentinel the consistency checker flags.
//!
//! `locate_at` / `locate_before` / `locate_after` re-stamp an existing
//! node relative to a reference span; the `clone_*` variants deep-copy a
//! node that has to appear twice in the output (e.g. a guard condition
//! duplicated from a match discriminant).

use lsc_ast::*;

/// Anything carrying a primary span.
pub trait Located {
    fn span_of(&self) -> Span;
    fn relocate(&mut self, span: Span);
}

impl Located for Expr {
    fn span_of(&self) -> Span {
        self.span()
    }
    fn relocate(&mut self, span: Span) {
        self.set_span(span);
    }
}

impl Located for Stmt {
    fn span_of(&self) -> Span {
        self.span()
    }
    fn relocate(&mut self, span: Span) {
        self.set_span(span);
    }
}

impl Located for Ident {
    fn span_of(&self) -> Span {
        self.span
    }
    fn relocate(&mut self, span: Span) {
        self.span = span;
    }
}

impl Located for StrLit {
    fn span_of(&self) -> Span {
        self.span
    }
    fn relocate(&mut self, span: Span) {
        self.span = span;
    }
}

impl Located for BlockStmt {
    fn span_of(&self) -> Span {
        self.span
    }
    fn relocate(&mut self, span: Span) {
        self.span = span;
    }
}

/// Stamp `node` with the same span as the reference.
pub fn locate_at<N: Located>(mut node: N, reference: Span) -> N {
    node.relocate(reference);
    node
}

/// Stamp `node` with a zero-width span at the reference's start.
pub fn locate_before<N: Located>(mut node: N, reference: Span) -> N {
    node.relocate(reference.collapse_to_start());
    node
}

/// Stamp `node` with a zero-width span at the reference's end.
pub fn locate_after<N: Located>(mut node: N, reference: Span) -> N {
    node.relocate(reference.collapse_to_end());
    node
}

/// Deep-copy `node` and stamp the copy at the reference span.
pub fn clone_at<N: Located + Clone>(node: &N, reference: Span) -> N {
    locate_at(node.clone(), reference)
}

/// Deep-copy `node` and place the copy just before the reference.
pub fn clone_before<N: Located + Clone>(node: &N, reference: Span) -> N {
    locate_before(node.clone(), reference)
}

/// Deep-copy `node` and place the copy just after the reference.
pub fn clone_after<N: Located + Clone>(node: &N, reference: Span) -> N {
    locate_after(node.clone(), reference)
}

// --- Identifiers and literals ---

pub fn ident(sym: impl Into<String>, span: Span) -> Ident {
    Ident {
        span,
        sym: sym.into(),
    }
}

pub fn ident_expr(id: Ident) -> Expr {
    Expr::Ident(id)
}

pub fn num(value: f64, span: Span) -> Expr {
    Expr::Num(NumLit { span, value })
}

pub fn str_lit(value: impl Into<String>, span: Span) -> StrLit {
    StrLit {
        span,
        value: value.into(),
    }
}

pub fn str_expr(value: impl Into<String>, span: Span) -> Expr {
    Expr::Str(str_lit(value, span))
}

pub fn null(span: Span) -> Expr {
    Expr::Null(NullLit { span })
}

pub fn this(span: Span) -> Expr {
    Expr::This(ThisExpr { span })
}

// --- Expressions ---

pub fn array(elems: Vec<Expr>, span: Span) -> Expr {
    Expr::Array(ArrayLit {
        span,
        elems: elems
            .into_iter()
            .map(|e| ExprOrSpread {
                spread: false,
                expr: Box::new(e),
            })
            .collect(),
    })
}

pub fn member(obj: Expr, prop: Ident) -> Expr {
    let span = obj.span();
    Expr::Member(MemberExpr {
        span,
        obj: Box::new(obj),
        prop: MemberProp::Ident(prop),
    })
}

pub fn computed_member(obj: Expr, prop: Expr) -> Expr {
    let span = obj.span();
    Expr::Member(MemberExpr {
        span,
        obj: Box::new(obj),
        prop: MemberProp::Computed(Box::new(prop)),
    })
}

pub fn call(callee: Expr, args: Vec<Expr>, span: Span) -> Expr {
    Expr::Call(CallExpr {
        span,
        callee: Box::new(callee),
        args: args
            .into_iter()
            .map(|e| ExprOrSpread {
                spread: false,
                expr: Box::new(e),
            })
            .collect(),
    })
}

/// `obj.method(args)`
pub fn method_call(obj: Expr, method: &str, args: Vec<Expr>, span: Span) -> Expr {
    let callee = member(obj, ident(method, span));
    call(callee, args, span)
}

pub fn bin(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::Bin(BinExpr {
        span,
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn cond(test: Expr, cons: Expr, alt: Expr, span: Span) -> Expr {
    Expr::Cond(CondExpr {
        span,
        test: Box::new(test),
        cons: Box::new(cons),
        alt: Box::new(alt),
    })
}

pub fn assign_ident(target: Ident, value: Expr, span: Span) -> Expr {
    Expr::Assign(AssignExpr {
        span,
        op: AssignOp::Assign,
        left: AssignTarget::Ident(target),
        right: Box::new(value),
    })
}

pub fn assign_member(target: MemberExpr, value: Expr, span: Span) -> Expr {
    Expr::Assign(AssignExpr {
        span,
        op: AssignOp::Assign,
        left: AssignTarget::Member(target),
        right: Box::new(value),
    })
}

pub fn seq(exprs: Vec<Expr>, span: Span) -> Expr {
    Expr::Seq(SeqExpr { span, exprs })
}

pub fn await_expr(arg: Expr, span: Span) -> Expr {
    Expr::Await(AwaitExpr {
        span,
        arg: Box::new(arg),
    })
}

pub fn incr(arg: Expr, span: Span) -> Expr {
    Expr::Update(UpdateExpr {
        span,
        op: UpdateOp::Incr,
        prefix: false,
        arg: Box::new(arg),
    })
}

/// `(() => { stmts })()`, optionally `async`.
pub fn arrow_iife(stmts: Vec<Stmt>, is_async: bool, span: Span) -> Expr {
    let arrow = Expr::Arrow(ArrowExpr {
        span,
        params: vec![],
        body: BlockStmtOrExpr::Block(BlockStmt { span, stmts }),
        is_async,
    });
    call(arrow, vec![], span)
}

// --- Statements ---

pub fn expr_stmt(expr: Expr) -> Stmt {
    let span = expr.span();
    Stmt::Expr(ExprStmt {
        span,
        expr: Box::new(expr),
    })
}

pub fn return_stmt(arg: Option<Expr>, span: Span) -> Stmt {
    Stmt::Return(ReturnStmt {
        span,
        arg: arg.map(Box::new),
    })
}

pub fn block(stmts: Vec<Stmt>, span: Span) -> BlockStmt {
    BlockStmt { span, stmts }
}

pub fn block_stmt(stmts: Vec<Stmt>, span: Span) -> Stmt {
    Stmt::Block(block(stmts, span))
}

pub fn var_decl(kind: VarDeclKind, name: Pat, init: Option<Expr>, span: Span) -> VarDecl {
    VarDecl {
        span,
        kind,
        decls: vec![VarDeclarator {
            span,
            name,
            init: init.map(Box::new),
        }],
        implicit: false,
    }
}

/// `const <id> = <init>;`
pub fn const_decl(id: Ident, init: Expr, span: Span) -> Stmt {
    Stmt::VarDecl(var_decl(
        VarDeclKind::Const,
        Pat::Ident(id),
        Some(init),
        span,
    ))
}

/// `let <id> = <init>;` / `let <id>;`
pub fn let_decl(id: Ident, init: Option<Expr>, span: Span) -> Stmt {
    Stmt::VarDecl(var_decl(VarDeclKind::Let, Pat::Ident(id), init, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsc_ast::LineCol;

    fn span(start: u32, end: u32) -> Span {
        Span::new(
            start,
            end,
            LineCol {
                line: 1,
                column: start,
            },
            LineCol {
                line: 1,
                column: end,
            },
        )
    }

    #[test]
    fn synthesized_nodes_carry_the_reference_span() {
        let s = span(4, 9);
        let push = method_call(ident_expr(ident("_arr", s)), "push", vec![num(1.0, s)], s);
        assert_eq!(push.span(), s);
        if let Expr::Call(c) = &push {
            assert_eq!(c.callee.span(), s);
        } else {
            panic!("expected a call");
        }
    }

    #[test]
    fn locate_before_and_after_collapse() {
        let s = span(4, 9);
        let n = locate_after(null(Span::MISSING), s);
        assert_eq!(n.span().start, 9);
        assert_eq!(n.span().end, 9);
        let n = locate_before(null(Span::MISSING), s);
        assert_eq!(n.span().end, 4);
    }

    #[test]
    fn clone_at_duplicates_without_sharing() {
        let s = span(0, 1);
        let original = ident_expr(ident("x", s));
        let copy = clone_at(&original, span(5, 6));
        assert_eq!(original.span().start, 0);
        assert_eq!(copy.span().start, 5);
    }
}
