//! Terse function forms and fat-arrow method binding.
//!
//! Three outcomes, selected by two flags:
//! - skinny (`->`): an ordinary function (own `this`);
//! - generator (`*->`): a plain function expression immediately
//!   `.bind(this)`-wrapped, since no generator-arrow form exists;
//! - otherwise (`=>`): a genuine arrow, wrapped in a `const` declaration
//!   when the source was a named statement form.
//!
//! Fat-arrow methods bind at construction time: the surrounding
//! constructor gains `this.m = this.m.bind(this);` statements right after
//! its `super(...)` call (or at the top without one). Object-literal
//! methods bind through a hoisted temporary and a sequence expression.

use lsc_ast::*;

use crate::diag::{Diagnostic, ErrorKind, Result};
use crate::factory as f;
use crate::safe::TempDecls;

/// Terse body → block body (an expression body becomes its own
/// expression statement; the implicit-return pass finishes the job).
fn to_block(body: BlockStmtOrExpr) -> BlockStmt {
    match body {
        BlockStmtOrExpr::Block(block) => block,
        BlockStmtOrExpr::Expr(expr) => {
            let span = expr.span();
            BlockStmt {
                span,
                stmts: vec![f::expr_stmt(*expr)],
            }
        }
    }
}

fn to_function(terse: TerseFunction) -> Function {
    Function {
        span: terse.span,
        params: terse.params,
        body: to_block(terse.body),
        is_async: terse.is_async,
        is_generator: terse.is_generator,
        return_type: terse.return_type,
    }
}

/// `function (...) {...}.bind(this)`
fn bound_fn_expr(ident: Option<Ident>, function: Function, span: Span) -> Expr {
    let fn_expr = Expr::Fn(FnExpr {
        span,
        ident,
        function,
    });
    f::method_call(fn_expr, "bind", vec![f::this(span)], span)
}

/// Statement form `f() -> body`.
pub fn desugar_named_arrow_decl(node: LsNamedArrowDecl) -> Stmt {
    let span = node.span;
    let skinny = node.function.skinny;
    let generator = node.function.is_generator;
    if skinny && !generator {
        return Stmt::FnDecl(FnDecl {
            span,
            ident: node.ident,
            function: to_function(node.function),
        });
    }
    if generator {
        let init = bound_fn_expr(None, to_function(node.function), span);
        return f::const_decl(node.ident, init, span);
    }
    let terse = node.function;
    let arrow = Expr::Arrow(ArrowExpr {
        span: terse.span,
        params: terse.params,
        body: BlockStmtOrExpr::Block(to_block(terse.body)),
        is_async: terse.is_async,
    });
    f::const_decl(node.ident, arrow, span)
}

/// Expression form `f() -> body`.
pub fn desugar_named_arrow_expr(node: LsNamedArrowExpr) -> Expr {
    let span = node.span;
    let skinny = node.function.skinny;
    let generator = node.function.is_generator;
    if generator {
        return bound_fn_expr(Some(node.ident), to_function(node.function), span);
    }
    if skinny {
        return Expr::Fn(FnExpr {
            span,
            ident: Some(node.ident),
            function: to_function(node.function),
        });
    }
    let terse = node.function;
    Expr::Arrow(ArrowExpr {
        span,
        params: terse.params,
        body: BlockStmtOrExpr::Block(to_block(terse.body)),
        is_async: terse.is_async,
    })
}

/// Anonymous `(x) -> body` / `(x) => body`.
pub fn desugar_ls_arrow(node: LsArrowExpr) -> Expr {
    let span = node.span;
    let terse = node.function;
    if terse.is_generator {
        return bound_fn_expr(None, to_function(terse), span);
    }
    if terse.skinny {
        return Expr::Fn(FnExpr {
            span,
            ident: None,
            function: to_function(terse),
        });
    }
    Expr::Arrow(ArrowExpr {
        span,
        params: terse.params,
        body: BlockStmtOrExpr::Block(to_block(terse.body)),
        is_async: terse.is_async,
    })
}

/// Member form `obj.method() -> body`: assignment into the member.
pub fn desugar_member_arrow(node: LsMemberArrow) -> Stmt {
    let span = node.span;
    let terse = node.function;
    let value = if terse.is_generator {
        bound_fn_expr(None, to_function(terse), span)
    } else if terse.skinny {
        Expr::Fn(FnExpr {
            span,
            ident: None,
            function: to_function(terse),
        })
    } else {
        Expr::Arrow(ArrowExpr {
            span,
            params: terse.params,
            body: BlockStmtOrExpr::Block(to_block(terse.body)),
            is_async: terse.is_async,
        })
    };
    f::expr_stmt(f::assign_member(node.target, value, span))
}

/// `this.<key>` / `this[<key>]` for a method key.
fn this_member(key: &PropName, span: Span) -> MemberExpr {
    let prop = match key {
        PropName::Ident(id) => MemberProp::Ident(f::clone_at(id, span)),
        PropName::Str(s) => MemberProp::Computed(Box::new(Expr::Str(f::clone_at(s, span)))),
        PropName::Num(n) => MemberProp::Computed(Box::new(Expr::Num(NumLit {
            span,
            value: n.value,
        }))),
        PropName::Computed(c) => MemberProp::Computed(Box::new(f::clone_at(&*c.expr, span))),
    };
    MemberExpr {
        span,
        obj: Box::new(f::this(span)),
        prop,
    }
}

/// `this.m = this.m.bind(this);`
fn bind_stmt(key: &PropName, span: Span) -> Stmt {
    let target = this_member(key, span);
    let value = f::method_call(
        Expr::Member(this_member(key, span)),
        "bind",
        vec![f::this(span)],
        span,
    );
    f::expr_stmt(f::assign_member(target, value, span))
}

fn contains_super_call(stmts: &[Stmt]) -> bool {
    fn stmt_has(stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Expr(es) => expr_has(&es.expr),
            Stmt::Block(b) => b.stmts.iter().any(stmt_has),
            Stmt::If(n) => {
                expr_has(&n.test)
                    || stmt_has(&n.cons)
                    || n.alt.as_deref().map(stmt_has).unwrap_or(false)
            }
            Stmt::Return(n) => n.arg.as_deref().map(expr_has).unwrap_or(false),
            Stmt::Try(n) => {
                n.block.stmts.iter().any(stmt_has)
                    || n.handler
                        .as_ref()
                        .map(|h| h.body.stmts.iter().any(stmt_has))
                        .unwrap_or(false)
                    || n.finalizer
                        .as_ref()
                        .map(|fin| fin.stmts.iter().any(stmt_has))
                        .unwrap_or(false)
            }
            Stmt::While(n) => expr_has(&n.test) || stmt_has(&n.body),
            Stmt::For(n) => stmt_has(&n.body),
            Stmt::ForIn(n) => stmt_has(&n.body),
            Stmt::ForOf(n) => stmt_has(&n.body),
            _ => false,
        }
    }
    fn expr_has(expr: &Expr) -> bool {
        match expr {
            Expr::Call(n) => {
                matches!(n.callee.as_ref(), Expr::Super(_))
                    || expr_has(&n.callee)
                    || n.args.iter().any(|a| expr_has(&a.expr))
            }
            Expr::Seq(n) => n.exprs.iter().any(expr_has),
            Expr::Cond(n) => expr_has(&n.test) || expr_has(&n.cons) || expr_has(&n.alt),
            Expr::Bin(n) => expr_has(&n.left) || expr_has(&n.right),
            Expr::Assign(n) => expr_has(&n.right),
            Expr::Await(n) => expr_has(&n.arg),
            _ => false,
        }
    }
    stmts.iter().any(stmt_has)
}

fn has_return_super(stmts: &[Stmt]) -> bool {
    fn stmt_has(stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Return(ret) => matches!(
                ret.arg.as_deref(),
                Some(Expr::Call(call)) if matches!(call.callee.as_ref(), Expr::Super(_))
            ),
            Stmt::Block(b) => b.stmts.iter().any(stmt_has),
            Stmt::If(n) => {
                stmt_has(&n.cons) || n.alt.as_deref().map(stmt_has).unwrap_or(false)
            }
            _ => false,
        }
    }
    stmts.iter().any(stmt_has)
}

/// Index of the statement right after a top-level `super(...)` call.
fn after_super_index(stmts: &[Stmt]) -> Option<usize> {
    stmts.iter().position(|stmt| {
        matches!(
            stmt,
            Stmt::Expr(es) if matches!(
                es.expr.as_ref(),
                Expr::Call(call) if matches!(call.callee.as_ref(), Expr::Super(_))
            )
        )
    })
    .map(|idx| idx + 1)
}

/// Constructor-time binding of fat-arrow methods, plus `super`
/// normalization for implicit constructors. Runs on class exit, after
/// every member body has been desugared.
pub fn normalize_class(class: &mut Class, temps: &mut dyn TempDecls) -> Result<()> {
    let span = class.span;

    let mut bound_keys: Vec<(PropName, Span)> = Vec::new();
    for member in &mut class.body {
        if let ClassMember::Method(method) = member {
            if method.bound {
                method.bound = false;
                bound_keys.push((method.key.clone(), method.span));
            }
        }
    }

    let ctor_idx = class
        .body
        .iter()
        .position(|member| matches!(member, ClassMember::Constructor(_)));

    match ctor_idx {
        Some(idx) => {
            let has_super = class.super_class.is_some();
            let ClassMember::Constructor(ctor) = &mut class.body[idx] else {
                unreachable!("position above found a constructor");
            };
            if !bound_keys.is_empty() && has_return_super(&ctor.body.stmts) {
                return Err(Diagnostic::new(
                    ctor.span,
                    ErrorKind::ReturnSuperWithBoundMethods,
                ));
            }
            // An implicit constructor under a superclass must forward.
            if has_super && ctor.implicit && !contains_super_call(&ctor.body.stmts) {
                let super_span = ctor.span.collapse_to_start();
                let forward = f::expr_stmt(Expr::Call(CallExpr {
                    span: super_span,
                    callee: Box::new(Expr::Super(SuperExpr { span: super_span })),
                    args: vec![ExprOrSpread {
                        spread: true,
                        expr: Box::new(f::ident_expr(f::ident("arguments", super_span))),
                    }],
                }));
                ctor.body.stmts.insert(0, forward);
            }
            ctor.implicit = false;
            if !bound_keys.is_empty() {
                let at = after_super_index(&ctor.body.stmts).unwrap_or(0);
                let binds: Vec<Stmt> = bound_keys
                    .iter()
                    .map(|(key, key_span)| bind_stmt(key, *key_span))
                    .collect();
                ctor.body.stmts.splice(at..at, binds);
            }
        }
        None if !bound_keys.is_empty() => {
            // Synthesize a minimal constructor.
            let mut stmts = Vec::new();
            let mut params = Vec::new();
            if class.super_class.is_some() {
                let args = temps.fresh("args", span.collapse_to_start());
                params.push(Pat::Rest(RestPat {
                    span: args.span,
                    arg: Box::new(Pat::Ident(args.clone())),
                }));
                stmts.push(f::expr_stmt(Expr::Call(CallExpr {
                    span: span.collapse_to_start(),
                    callee: Box::new(Expr::Super(SuperExpr {
                        span: span.collapse_to_start(),
                    })),
                    args: vec![ExprOrSpread {
                        spread: true,
                        expr: Box::new(f::ident_expr(args)),
                    }],
                })));
            }
            stmts.extend(
                bound_keys
                    .iter()
                    .map(|(key, key_span)| bind_stmt(key, *key_span)),
            );
            class.body.insert(
                0,
                ClassMember::Constructor(Constructor {
                    span: span.collapse_to_start(),
                    params,
                    body: f::block(stmts, span.collapse_to_start()),
                    implicit: false,
                }),
            );
        }
        None => {}
    }
    Ok(())
}

/// Post-construction binding for fat-arrow methods of an object literal:
/// `(_obj = {...}, _obj.m = _obj.m.bind(_obj), _obj)`.
pub fn bind_object_methods(object: &mut Expr, temps: &mut dyn TempDecls) {
    let Expr::Object(lit) = object else { return };
    let mut bound_keys: Vec<(PropName, Span)> = Vec::new();
    for prop in &mut lit.props {
        if let Prop::Method(method) = prop {
            if method.bound {
                method.bound = false;
                bound_keys.push((method.key.clone(), method.span));
            }
        }
    }
    if bound_keys.is_empty() {
        return;
    }

    let span = lit.span;
    let temp = temps.fresh_declared("obj", span);
    let taken = std::mem::replace(object, f::null(Span::MISSING));

    let mut exprs = vec![f::assign_ident(temp.clone(), taken, span)];
    for (key, key_span) in bound_keys {
        let target = obj_member(&temp, &key, key_span);
        let value = f::method_call(
            Expr::Member(obj_member(&temp, &key, key_span)),
            "bind",
            vec![f::ident_expr(f::clone_at(&temp, key_span))],
            key_span,
        );
        exprs.push(f::assign_member(target, value, key_span));
    }
    exprs.push(f::ident_expr(f::clone_at(&temp, span)));

    *object = f::seq(exprs, span);
}

fn obj_member(obj: &Ident, key: &PropName, span: Span) -> MemberExpr {
    let prop = match key {
        PropName::Ident(id) => MemberProp::Ident(f::clone_at(id, span)),
        PropName::Str(s) => MemberProp::Computed(Box::new(Expr::Str(f::clone_at(s, span)))),
        PropName::Num(n) => MemberProp::Computed(Box::new(Expr::Num(NumLit {
            span,
            value: n.value,
        }))),
        PropName::Computed(c) => MemberProp::Computed(Box::new(f::clone_at(&*c.expr, span))),
    };
    MemberExpr {
        span,
        obj: Box::new(f::ident_expr(f::clone_at(obj, span))),
        prop,
    }
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

    fn terse(skinny: bool, generator: bool) -> TerseFunction {
        TerseFunction {
            span: sp(0),
            params: vec![],
            body: BlockStmtOrExpr::Expr(Box::new(f::num(1.0, sp(1)))),
            skinny,
            is_async: false,
            is_generator: generator,
            return_type: None,
        }
    }

    #[test]
    fn skinny_statement_form_is_a_function_declaration() {
        let node = LsNamedArrowDecl {
            span: sp(0),
            ident: f::ident("f", sp(0)),
            function: terse(true, false),
        };
        let out = desugar_named_arrow_decl(node);
        let Stmt::FnDecl(decl) = out else {
            panic!("expected a function declaration")
        };
        assert_eq!(decl.ident.sym, "f");
        // Expression body became a block; the return comes later from
        // the implicit-return pass.
        assert_eq!(decl.function.body.stmts.len(), 1);
        assert!(matches!(decl.function.body.stmts[0], Stmt::Expr(_)));
    }

    #[test]
    fn fat_statement_form_is_a_const_arrow() {
        let node = LsNamedArrowDecl {
            span: sp(0),
            ident: f::ident("f", sp(0)),
            function: terse(false, false),
        };
        let Stmt::VarDecl(decl) = desugar_named_arrow_decl(node) else {
            panic!("expected a const declaration")
        };
        assert_eq!(decl.kind, VarDeclKind::Const);
        let init = decl.decls[0].init.as_ref().unwrap();
        assert!(matches!(init.as_ref(), Expr::Arrow(_)));
    }

    #[test]
    fn generator_form_binds_this() {
        let node = LsNamedArrowDecl {
            span: sp(0),
            ident: f::ident("g", sp(0)),
            function: terse(true, true),
        };
        let Stmt::VarDecl(decl) = desugar_named_arrow_decl(node) else {
            panic!("expected a const declaration")
        };
        let init = decl.decls[0].init.as_ref().unwrap();
        let Expr::Call(call) = init.as_ref() else {
            panic!("expected the .bind(this) call")
        };
        let Expr::Member(member) = call.callee.as_ref() else {
            panic!("expected a member callee")
        };
        let Expr::Fn(fn_expr) = member.obj.as_ref() else {
            panic!("expected a function expression")
        };
        assert!(fn_expr.function.is_generator);
        assert!(matches!(call.args[0].expr.as_ref(), Expr::This(_)));
    }

    fn bound_method(name: &str, n: u32) -> ClassMember {
        ClassMember::Method(ClassMethod {
            span: sp(n),
            key: PropName::Ident(f::ident(name, sp(n))),
            function: Function {
                span: sp(n),
                params: vec![],
                body: f::block(vec![], sp(n)),
                is_async: false,
                is_generator: false,
                return_type: None,
            },
            kind: MethodKind::Method,
            is_static: false,
            bound: true,
        })
    }

    fn super_call_stmt(n: u32) -> Stmt {
        f::expr_stmt(Expr::Call(CallExpr {
            span: sp(n),
            callee: Box::new(Expr::Super(SuperExpr { span: sp(n) })),
            args: vec![],
        }))
    }

    #[test]
    fn bound_method_binds_after_super() {
        let mut class = Class {
            span: sp(0),
            super_class: Some(Box::new(f::ident_expr(f::ident("Base", sp(1))))),
            body: vec![
                ClassMember::Constructor(Constructor {
                    span: sp(2),
                    params: vec![],
                    body: f::block(
                        vec![super_call_stmt(3), f::expr_stmt(f::num(1.0, sp(4)))],
                        sp(2),
                    ),
                    implicit: false,
                }),
                bound_method("m", 5),
            ],
        };
        normalize_class(&mut class, &mut Temps(0)).unwrap();
        let ClassMember::Constructor(ctor) = &class.body[0] else {
            panic!("expected the constructor")
        };
        // super(); this.m = this.m.bind(this); 1;
        assert_eq!(ctor.body.stmts.len(), 3);
        let Stmt::Expr(bind) = &ctor.body.stmts[1] else {
            panic!("expected the bind statement")
        };
        assert!(matches!(bind.expr.as_ref(), Expr::Assign(_)));
        // The flag is consumed.
        let ClassMember::Method(m) = &class.body[1] else {
            panic!("expected the method")
        };
        assert!(!m.bound);
    }

    #[test]
    fn missing_constructor_is_synthesized_with_super_forwarding() {
        let mut class = Class {
            span: sp(0),
            super_class: Some(Box::new(f::ident_expr(f::ident("Base", sp(1))))),
            body: vec![bound_method("m", 2)],
        };
        normalize_class(&mut class, &mut Temps(0)).unwrap();
        let ClassMember::Constructor(ctor) = &class.body[0] else {
            panic!("expected a synthesized constructor first")
        };
        assert!(matches!(ctor.params[0], Pat::Rest(_)));
        // super(...args); then the bind.
        assert_eq!(ctor.body.stmts.len(), 2);
        let Stmt::Expr(sup) = &ctor.body.stmts[0] else {
            panic!("expected the super call")
        };
        let Expr::Call(call) = sup.expr.as_ref() else {
            panic!("expected the super call")
        };
        assert!(matches!(call.callee.as_ref(), Expr::Super(_)));
        assert!(call.args[0].spread);
    }

    #[test]
    fn return_super_with_bound_methods_is_fatal() {
        let mut class = Class {
            span: sp(0),
            super_class: Some(Box::new(f::ident_expr(f::ident("Base", sp(1))))),
            body: vec![
                ClassMember::Constructor(Constructor {
                    span: sp(2),
                    params: vec![],
                    body: f::block(
                        vec![Stmt::Return(ReturnStmt {
                            span: sp(3),
                            arg: Some(Box::new(Expr::Call(CallExpr {
                                span: sp(3),
                                callee: Box::new(Expr::Super(SuperExpr { span: sp(3) })),
                                args: vec![],
                            }))),
                        })],
                        sp(2),
                    ),
                    implicit: false,
                }),
                bound_method("m", 4),
            ],
        };
        let err = normalize_class(&mut class, &mut Temps(0)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ReturnSuperWithBoundMethods));
    }

    #[test]
    fn implicit_constructor_under_superclass_forwards_arguments() {
        let mut class = Class {
            span: sp(0),
            super_class: Some(Box::new(f::ident_expr(f::ident("Base", sp(1))))),
            body: vec![ClassMember::Constructor(Constructor {
                span: sp(2),
                params: vec![],
                body: f::block(vec![f::expr_stmt(f::num(1.0, sp(3)))], sp(2)),
                implicit: true,
            })],
        };
        normalize_class(&mut class, &mut Temps(0)).unwrap();
        let ClassMember::Constructor(ctor) = &class.body[0] else {
            panic!("expected the constructor")
        };
        let Stmt::Expr(first) = &ctor.body.stmts[0] else {
            panic!("expected the injected super call")
        };
        let Expr::Call(call) = first.expr.as_ref() else {
            panic!("expected the injected super call")
        };
        assert!(matches!(call.callee.as_ref(), Expr::Super(_)));
        assert!(!ctor.implicit);
    }

    #[test]
    fn explicit_constructor_with_super_is_left_alone() {
        let mut class = Class {
            span: sp(0),
            super_class: Some(Box::new(f::ident_expr(f::ident("Base", sp(1))))),
            body: vec![ClassMember::Constructor(Constructor {
                span: sp(2),
                params: vec![],
                body: f::block(vec![super_call_stmt(3)], sp(2)),
                implicit: false,
            })],
        };
        normalize_class(&mut class, &mut Temps(0)).unwrap();
        let ClassMember::Constructor(ctor) = &class.body[0] else {
            panic!("expected the constructor")
        };
        assert_eq!(ctor.body.stmts.len(), 1);
    }

    #[test]
    fn object_literal_methods_bind_through_a_temporary() {
        let mut object = Expr::Object(ObjectLit {
            span: sp(0),
            props: vec![Prop::Method(ObjectMethod {
                span: sp(1),
                key: PropName::Ident(f::ident("m", sp(1))),
                function: Function {
                    span: sp(1),
                    params: vec![],
                    body: f::block(vec![], sp(1)),
                    is_async: false,
                    is_generator: false,
                    return_type: None,
                },
                kind: MethodKind::Method,
                bound: true,
            })],
        });
        bind_object_methods(&mut object, &mut Temps(0));
        let Expr::Seq(seq) = object else {
            panic!("expected a sequence expression")
        };
        // (_obj = {...}, _obj.m = _obj.m.bind(_obj), _obj)
        assert_eq!(seq.exprs.len(), 3);
        assert!(matches!(&seq.exprs[0], Expr::Assign(_)));
        assert!(matches!(&seq.exprs[1], Expr::Assign(_)));
        assert!(matches!(&seq.exprs[2], Expr::Ident(_)));
    }
}
