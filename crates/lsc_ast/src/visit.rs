//! Mutable AST traversal.
//!
//! Implement the methods you care about (e.g. `visit_mut_expr`) and call
//! the corresponding `walk_mut_*` function to recurse into children;
//! work done before the call runs on enter, work done after runs on exit.
//!
//! `visit_mut_stmts` is the override point for passes that need to splice
//! sibling statements: a visitor can rebuild the vector around the
//! default per-statement traversal.

use crate::ast::*;
use crate::ext::*;

pub trait VisitMut {
    fn visit_mut_program(&mut self, program: &mut Program) {
        walk_mut_program(self, program)
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        walk_mut_stmts(self, stmts)
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        walk_mut_stmt(self, stmt)
    }

    fn visit_mut_block_stmt(&mut self, block: &mut BlockStmt) {
        walk_mut_block_stmt(self, block)
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        walk_mut_expr(self, expr)
    }

    fn visit_mut_pat(&mut self, pat: &mut Pat) {
        walk_mut_pat(self, pat)
    }

    fn visit_mut_function(&mut self, function: &mut Function) {
        walk_mut_function(self, function)
    }

    fn visit_mut_terse_function(&mut self, function: &mut TerseFunction) {
        walk_mut_terse_function(self, function)
    }

    fn visit_mut_class(&mut self, class: &mut Class) {
        walk_mut_class(self, class)
    }
}

pub fn walk_mut_program<V: VisitMut + ?Sized>(v: &mut V, program: &mut Program) {
    v.visit_mut_stmts(&mut program.body);
}

pub fn walk_mut_stmts<V: VisitMut + ?Sized>(v: &mut V, stmts: &mut Vec<Stmt>) {
    for stmt in stmts.iter_mut() {
        v.visit_mut_stmt(stmt);
    }
}

pub fn walk_mut_block_stmt<V: VisitMut + ?Sized>(v: &mut V, block: &mut BlockStmt) {
    v.visit_mut_stmts(&mut block.stmts);
}

pub fn walk_mut_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match stmt {
        Stmt::Expr(n) => v.visit_mut_expr(&mut n.expr),
        Stmt::Block(n) => v.visit_mut_block_stmt(n),
        Stmt::VarDecl(n) => walk_mut_var_decl(v, n),
        Stmt::FnDecl(n) => v.visit_mut_function(&mut n.function),
        Stmt::ClassDecl(n) => v.visit_mut_class(&mut n.class),
        Stmt::Return(n) => {
            if let Some(arg) = &mut n.arg {
                v.visit_mut_expr(arg);
            }
        }
        Stmt::If(n) => {
            v.visit_mut_expr(&mut n.test);
            v.visit_mut_stmt(&mut n.cons);
            if let Some(alt) = &mut n.alt {
                v.visit_mut_stmt(alt);
            }
        }
        Stmt::For(n) => {
            match &mut n.init {
                Some(VarDeclOrExpr::VarDecl(decl)) => walk_mut_var_decl(v, decl),
                Some(VarDeclOrExpr::Expr(expr)) => v.visit_mut_expr(expr),
                None => {}
            }
            if let Some(test) = &mut n.test {
                v.visit_mut_expr(test);
            }
            if let Some(update) = &mut n.update {
                v.visit_mut_expr(update);
            }
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::ForIn(n) => {
            walk_mut_for_head(v, &mut n.left);
            v.visit_mut_expr(&mut n.right);
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::ForOf(n) => {
            walk_mut_for_head(v, &mut n.left);
            v.visit_mut_expr(&mut n.right);
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::While(n) => {
            v.visit_mut_expr(&mut n.test);
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::DoWhile(n) => {
            v.visit_mut_stmt(&mut n.body);
            v.visit_mut_expr(&mut n.test);
        }
        Stmt::Try(n) => {
            v.visit_mut_block_stmt(&mut n.block);
            if let Some(handler) = &mut n.handler {
                if let Some(param) = &mut handler.param {
                    v.visit_mut_pat(param);
                }
                v.visit_mut_block_stmt(&mut handler.body);
            }
            if let Some(finalizer) = &mut n.finalizer {
                v.visit_mut_block_stmt(finalizer);
            }
        }
        Stmt::Throw(n) => v.visit_mut_expr(&mut n.arg),
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) | Stmt::Import(_) => {}
        Stmt::LsRangeLoop(n) => {
            v.visit_mut_expr(&mut n.start);
            v.visit_mut_expr(&mut n.end);
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::LsArrayIter(n) => {
            v.visit_mut_expr(&mut n.array);
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::LsObjectIter(n) => {
            v.visit_mut_expr(&mut n.object);
            v.visit_mut_stmt(&mut n.body);
        }
        Stmt::LsNamedArrowDecl(n) => v.visit_mut_terse_function(&mut n.function),
        Stmt::LsMemberArrow(n) => {
            walk_mut_member_parts(v, &mut n.target);
            v.visit_mut_terse_function(&mut n.function);
        }
    }
}

fn walk_mut_var_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut VarDecl) {
    for declarator in &mut decl.decls {
        v.visit_mut_pat(&mut declarator.name);
        if let Some(init) = &mut declarator.init {
            v.visit_mut_expr(init);
        }
    }
}

fn walk_mut_for_head<V: VisitMut + ?Sized>(v: &mut V, head: &mut ForHead) {
    match head {
        ForHead::VarDecl(decl) => walk_mut_var_decl(v, decl),
        ForHead::Pat(pat) => v.visit_mut_pat(pat),
    }
}

fn walk_mut_member_parts<V: VisitMut + ?Sized>(v: &mut V, member: &mut MemberExpr) {
    v.visit_mut_expr(&mut member.obj);
    if let MemberProp::Computed(expr) = &mut member.prop {
        v.visit_mut_expr(expr);
    }
}

fn walk_mut_args<V: VisitMut + ?Sized>(v: &mut V, args: &mut [ExprOrSpread]) {
    for arg in args {
        v.visit_mut_expr(&mut arg.expr);
    }
}

fn walk_mut_block_or_expr<V: VisitMut + ?Sized>(v: &mut V, body: &mut BlockStmtOrExpr) {
    match body {
        BlockStmtOrExpr::Block(block) => v.visit_mut_block_stmt(block),
        BlockStmtOrExpr::Expr(expr) => v.visit_mut_expr(expr),
    }
}

pub fn walk_mut_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Ident(_)
        | Expr::Num(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Null(_)
        | Expr::This(_)
        | Expr::Super(_) => {}
        Expr::Array(n) => walk_mut_args(v, &mut n.elems),
        Expr::Object(n) => {
            for prop in &mut n.props {
                match prop {
                    Prop::KeyValue(kv) => {
                        walk_mut_prop_name(v, &mut kv.key);
                        v.visit_mut_expr(&mut kv.value);
                    }
                    Prop::Shorthand(_) => {}
                    Prop::Method(m) => {
                        walk_mut_prop_name(v, &mut m.key);
                        v.visit_mut_function(&mut m.function);
                    }
                    Prop::Spread(s) => v.visit_mut_expr(&mut s.expr),
                }
            }
        }
        Expr::Fn(n) => v.visit_mut_function(&mut n.function),
        Expr::Arrow(n) => {
            for param in &mut n.params {
                v.visit_mut_pat(param);
            }
            walk_mut_block_or_expr(v, &mut n.body);
        }
        Expr::Class(n) => v.visit_mut_class(&mut n.class),
        Expr::Call(n) => {
            v.visit_mut_expr(&mut n.callee);
            walk_mut_args(v, &mut n.args);
        }
        Expr::New(n) => {
            v.visit_mut_expr(&mut n.callee);
            walk_mut_args(v, &mut n.args);
        }
        Expr::Member(n) => walk_mut_member_parts(v, n),
        Expr::Cond(n) => {
            v.visit_mut_expr(&mut n.test);
            v.visit_mut_expr(&mut n.cons);
            v.visit_mut_expr(&mut n.alt);
        }
        Expr::Assign(n) => {
            match &mut n.left {
                AssignTarget::Ident(_) => {}
                AssignTarget::Member(member) => walk_mut_member_parts(v, member),
                AssignTarget::Pat(pat) => v.visit_mut_pat(pat),
            }
            v.visit_mut_expr(&mut n.right);
        }
        Expr::Bin(n) => {
            v.visit_mut_expr(&mut n.left);
            v.visit_mut_expr(&mut n.right);
        }
        Expr::Unary(n) => v.visit_mut_expr(&mut n.arg),
        Expr::Update(n) => v.visit_mut_expr(&mut n.arg),
        Expr::Await(n) => v.visit_mut_expr(&mut n.arg),
        Expr::Yield(n) => {
            if let Some(arg) = &mut n.arg {
                v.visit_mut_expr(arg);
            }
        }
        Expr::Seq(n) => {
            for e in &mut n.exprs {
                v.visit_mut_expr(e);
            }
        }
        Expr::LsSafeMember(n) => {
            v.visit_mut_expr(&mut n.obj);
            if let MemberProp::Computed(prop) = &mut n.prop {
                v.visit_mut_expr(prop);
            }
        }
        Expr::LsSafeAwait(n) => v.visit_mut_expr(&mut n.arg),
        Expr::LsTildeCall(n) => {
            v.visit_mut_expr(&mut n.left);
            v.visit_mut_expr(&mut n.callee);
            walk_mut_args(v, &mut n.args);
        }
        Expr::LsArrayComprehension(n) => v.visit_mut_stmt(&mut n.loop_stmt),
        Expr::LsObjectComprehension(n) => v.visit_mut_stmt(&mut n.loop_stmt),
        Expr::LsIfExpr(n) => {
            v.visit_mut_expr(&mut n.test);
            walk_mut_block_or_expr(v, &mut n.cons);
            if let Some(alt) = &mut n.alt {
                walk_mut_block_or_expr(v, alt);
            }
        }
        Expr::LsMatch(n) => {
            v.visit_mut_expr(&mut n.discriminant);
            for arm in &mut n.arms {
                for test in &mut arm.tests {
                    v.visit_mut_expr(test);
                }
                if let Some(pattern) = &mut arm.pattern {
                    v.visit_mut_pat(pattern);
                }
                walk_mut_block_or_expr(v, &mut arm.body);
            }
        }
        Expr::LsNamedArrow(n) => v.visit_mut_terse_function(&mut n.function),
        Expr::LsArrow(n) => v.visit_mut_terse_function(&mut n.function),
    }
}

fn walk_mut_prop_name<V: VisitMut + ?Sized>(v: &mut V, name: &mut PropName) {
    if let PropName::Computed(computed) = name {
        v.visit_mut_expr(&mut computed.expr);
    }
}

pub fn walk_mut_pat<V: VisitMut + ?Sized>(v: &mut V, pat: &mut Pat) {
    match pat {
        Pat::Ident(_) => {}
        Pat::Array(n) => {
            for elem in n.elems.iter_mut().flatten() {
                v.visit_mut_pat(elem);
            }
        }
        Pat::Object(n) => {
            for prop in &mut n.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => v.visit_mut_pat(&mut kv.value),
                    ObjectPatProp::Shorthand(s) => {
                        if let Some(default) = &mut s.default {
                            v.visit_mut_expr(default);
                        }
                    }
                    ObjectPatProp::Rest(r) => v.visit_mut_pat(&mut r.arg),
                }
            }
        }
        Pat::Assign(n) => {
            v.visit_mut_pat(&mut n.left);
            v.visit_mut_expr(&mut n.right);
        }
        Pat::Rest(n) => v.visit_mut_pat(&mut n.arg),
    }
}

pub fn walk_mut_function<V: VisitMut + ?Sized>(v: &mut V, function: &mut Function) {
    for param in &mut function.params {
        v.visit_mut_pat(param);
    }
    v.visit_mut_block_stmt(&mut function.body);
}

pub fn walk_mut_terse_function<V: VisitMut + ?Sized>(v: &mut V, function: &mut TerseFunction) {
    for param in &mut function.params {
        v.visit_mut_pat(param);
    }
    walk_mut_block_or_expr(v, &mut function.body);
}

pub fn walk_mut_class<V: VisitMut + ?Sized>(v: &mut V, class: &mut Class) {
    if let Some(super_class) = &mut class.super_class {
        v.visit_mut_expr(super_class);
    }
    for member in &mut class.body {
        match member {
            ClassMember::Constructor(c) => {
                for param in &mut c.params {
                    v.visit_mut_pat(param);
                }
                v.visit_mut_block_stmt(&mut c.body);
            }
            ClassMember::Method(m) => {
                walk_mut_prop_name(v, &mut m.key);
                v.visit_mut_function(&mut m.function);
            }
        }
    }
}
