//! Pass orchestrator.
//!
//! One traversal of the program applies every rule. Enter-phase rules
//! rewrite extension nodes in place and the traversal then descends into
//! the replacement, so nested sugar (a comprehension inside a matched
//! arm inside an arrow) composes without extra passes. Exit-phase rules
//! (tilde calls, implicit returns, class normalization) run after a
//! node's children have fully settled, which pins the ordering the rules
//! depend on:
//!
//! 1. safe navigation (enter) resolves before its enclosing tilde call
//!    (exit);
//! 2. comprehensions and loops (enter) desugar before implicit-return
//!    analysis walks the function body (function exit);
//! 3. terse-function normalization (enter) runs before implicit return,
//!    so bodies are always block-form by then.
//!
//! The desugarer also carries the scope stack, the pending-statement
//! queue that lets rules hoist declarations before the statement under
//! rewrite (wrapped into a block when the statement sits in a bare
//! branch position), the import table, and the first fatal diagnostic,
//! which aborts the traversal.

use lsc_ast::visit::{self, VisitMut};
use lsc_ast::*;
use serde::{Deserialize, Serialize};

use crate::diag::{Diagnostic, ErrorKind, Result};
use crate::factory as f;
use crate::match_expr::{self, MatchCtx};
use crate::safe::{self, TempDecls};
use crate::scope::{self, BindingKind, ScopeKind, ScopeStack};
use crate::stdlib::{ImportTable, StdlibOptions};
use crate::{comprehension, functions, if_expr, implicit_return, loops, tilde};

/// Configuration recognized at the system boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Options {
    /// Parser feature flags, carried through opaquely.
    #[serde(default)]
    pub syntax: LsSyntax,
    #[serde(default)]
    pub stdlib: StdlibOptions,
}

struct FnCtx {
    is_async: bool,
    skip_implicit_return: bool,
    /// `let` declarations to hoist to the top of this function's body.
    pending_decls: Vec<Ident>,
}

pub struct Desugarer<'a> {
    registry: &'static TypeRegistry,
    options: &'a Options,
    scopes: ScopeStack,
    fns: Vec<FnCtx>,
    /// Statements to splice before the statement currently being visited.
    pending_before: Vec<Stmt>,
    imports: ImportTable,
    has_props: Option<Ident>,
    next_fn_skips_return: bool,
    error: Option<Diagnostic>,
}

/// Reserve every underscore-prefixed identifier the source already uses,
/// so generated temporaries cannot collide with it no matter where the
/// traversal currently stands.
struct ReserveUnderscores<'a> {
    scopes: &'a mut ScopeStack,
}

impl VisitMut for ReserveUnderscores<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::FnDecl(d) => self.scopes.reserve(&d.ident.sym),
            Stmt::ClassDecl(d) => self.scopes.reserve(&d.ident.sym),
            Stmt::Import(d) => {
                for spec in &d.specifiers {
                    self.scopes.reserve(&spec.local.sym);
                }
            }
            Stmt::LsNamedArrowDecl(d) => self.scopes.reserve(&d.ident.sym),
            _ => {}
        }
        visit::walk_mut_stmt(self, stmt);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident(id) => self.scopes.reserve(&id.sym),
            Expr::LsNamedArrow(n) => self.scopes.reserve(&n.ident.sym),
            _ => {}
        }
        visit::walk_mut_expr(self, expr);
    }

    fn visit_mut_pat(&mut self, pat: &mut Pat) {
        let mut names = Vec::new();
        pat.bound_names(&mut names);
        let names: Vec<String> = names.into_iter().map(|id| id.sym.clone()).collect();
        for name in names {
            self.scopes.reserve(&name);
        }
        visit::walk_mut_pat(self, pat);
    }
}

/// Desugar a whole program. The first fatal construct violation aborts
/// the compilation; there is no partial output.
pub fn desugar_program(mut program: Program, options: &Options) -> Result<Program> {
    let registry = TypeRegistry::global();
    let mut scopes = ScopeStack::new();
    ReserveUnderscores { scopes: &mut scopes }.visit_mut_program(&mut program);
    let mut d = Desugarer {
        registry,
        options,
        scopes,
        fns: vec![FnCtx {
            is_async: false,
            skip_implicit_return: true,
            pending_decls: Vec::new(),
        }],
        pending_before: Vec::new(),
        imports: ImportTable::new(),
        has_props: None,
        next_fn_skips_return: false,
        error: None,
    };

    d.visit_mut_program(&mut program);
    if let Some(err) = d.error.take() {
        return Err(err);
    }

    let anchor = program.span.collapse_to_start();
    let program_ctx = d.fns.pop().expect("program context is always present");

    let mut front: Vec<Stmt> = Vec::new();
    if !d.imports.is_empty() {
        front.extend(d.imports.into_decls(d.options.stdlib.style, anchor));
    }
    if let Some(helper) = d.has_props {
        front.push(has_props_decl(&helper, anchor));
    }
    for id in program_ctx.pending_decls {
        front.push(f::let_decl(f::locate_at(id, anchor), None, anchor));
    }
    program.body.splice(0..0, front);

    Ok(program)
}

impl TempDecls for Desugarer<'_> {
    fn fresh(&mut self, hint: &str, span: Span) -> Ident {
        f::ident(self.scopes.fresh(hint), span)
    }

    fn fresh_declared(&mut self, hint: &str, span: Span) -> Ident {
        let id = self.fresh(hint, span);
        self.scopes.register(&id.sym, BindingKind::Synthetic);
        self.fns
            .last_mut()
            .expect("function context is always present")
            .pending_decls
            .push(id.clone());
        id
    }
}

impl MatchCtx for Desugarer<'_> {
    fn has_props(&mut self) -> Ident {
        if self.has_props.is_none() {
            let name = self.scopes.fresh("hasProps");
            self.has_props = Some(f::ident(name, Span::MISSING));
        }
        self.has_props.clone().expect("just set above")
    }
}

impl Desugarer<'_> {
    fn in_async_fn(&self) -> bool {
        self.fns
            .last()
            .expect("function context is always present")
            .is_async
    }

    fn fail(&mut self, diag: Diagnostic) {
        if self.error.is_none() {
            self.error = Some(diag);
        }
    }

    fn take_expr(&mut self, expr: &mut Expr) -> Expr {
        std::mem::replace(expr, f::null(Span::MISSING))
    }

    fn take_stmt(&mut self, stmt: &mut Stmt) -> Stmt {
        std::mem::replace(stmt, Stmt::Empty(EmptyStmt { span: Span::MISSING }))
    }

    /// Reassignment discipline: a bare-identifier target must have a
    /// visible, reassignable binding.
    fn check_assign(&mut self, assign: &AssignExpr) {
        let AssignTarget::Ident(id) = &assign.left else {
            return;
        };
        match self.scopes.lookup(&id.sym) {
            None => {
                let visible = self.scopes.visible_names();
                self.fail(Diagnostic::new(
                    id.span,
                    ErrorKind::AssignToUndeclared {
                        name: id.sym.clone(),
                        visible,
                    },
                ));
            }
            Some(kind) if !kind.is_reassignable() => {
                self.fail(Diagnostic::new(
                    id.span,
                    ErrorKind::AssignToConst {
                        name: id.sym.clone(),
                    },
                ));
            }
            Some(_) => {}
        }
    }

    /// Shadowing discipline for parser-synthesized `const` declarations.
    fn check_implicit_shadow(&mut self, decl: &mut VarDecl) {
        if decl.implicit && decl.kind == VarDeclKind::Const {
            for declarator in &decl.decls {
                let mut names = Vec::new();
                declarator.name.bound_names(&mut names);
                for id in names {
                    if self.scopes.lookup_enclosing(&id.sym).is_some() {
                        self.fail(Diagnostic::new(
                            id.span,
                            ErrorKind::ImplicitShadow {
                                name: id.sym.clone(),
                            },
                        ));
                        return;
                    }
                }
            }
        }
        decl.implicit = false;
    }

    fn record_stdlib_ref(&mut self, id: &Ident) {
        let opts = &self.options.stdlib;
        if opts.enabled
            && opts.helpers.iter().any(|h| h == &id.sym)
            && self.scopes.lookup(&id.sym).is_none()
        {
            self.imports.record(&opts.module, &id.sym);
        }
    }

    fn register_params(&mut self, params: &[Pat]) {
        for param in params {
            let mut names = Vec::new();
            param.bound_names(&mut names);
            for id in names {
                self.scopes.register(&id.sym, BindingKind::Param);
            }
        }
    }

    fn register_decl_names(&mut self, decl: &VarDecl) {
        let kind = BindingKind::from(decl.kind);
        for declarator in &decl.decls {
            let mut names = Vec::new();
            declarator.name.bound_names(&mut names);
            for id in names {
                self.scopes.register(&id.sym, kind);
            }
        }
    }

    fn visit_var_decl_parts(&mut self, decl: &mut VarDecl) {
        for declarator in &mut decl.decls {
            self.visit_mut_pat(&mut declarator.name);
            if let Some(init) = &mut declarator.init {
                self.visit_mut_expr(init);
            }
        }
    }

    /// Take the statements queued before the one under rewrite and run
    /// them through the visitor themselves: a hoisted initializer can
    /// still hold sugar (`for elem x in foo?.bar`). Hoists produced
    /// while visiting a hoist land in front of it.
    fn drain_pending_visited(&mut self) -> Vec<Stmt> {
        let mut out: Vec<Stmt> = Vec::new();
        let pending = std::mem::take(&mut self.pending_before);
        for mut hoisted in pending {
            self.visit_mut_stmt(&mut hoisted);
            let nested = self.drain_pending_visited();
            out.extend(nested);
            out.push(hoisted);
        }
        out
    }

    /// Visit a statement sitting in a bare branch position (if branch,
    /// loop body). Statements the rules hoist in front of it wrap the
    /// slot into a block, so the hoists stay inside the branch.
    fn visit_branch_stmt(&mut self, slot: &mut Stmt) {
        let saved = std::mem::take(&mut self.pending_before);
        self.visit_mut_stmt(slot);
        let pending = self.drain_pending_visited();
        self.pending_before = saved;
        if !pending.is_empty() {
            let span = slot.span();
            let original = self.take_stmt(slot);
            let mut stmts = pending;
            stmts.push(original);
            *slot = Stmt::Block(BlockStmt { span, stmts });
        }
    }

    /// Body traversal shared by every real function: scope, context,
    /// implicit return, pending hoists.
    fn visit_fn_body(&mut self, params: &mut [Pat], body: &mut BlockStmt, ctx: FnCtx) {
        self.fns.push(ctx);
        self.scopes.push(ScopeKind::Function);
        self.register_params(params);
        for param in params.iter_mut() {
            self.visit_mut_pat(param);
        }
        self.visit_mut_block_stmt(body);

        let skip = self.fns.last().expect("just pushed").skip_implicit_return;
        if self.error.is_none() && !skip {
            let registry = self.registry;
            if let Err(diag) = implicit_return::apply(body, registry, self) {
                self.fail(diag);
            }
        }
        let pending = std::mem::take(&mut self.fns.last_mut().expect("just pushed").pending_decls);
        for id in pending.into_iter().rev() {
            let span = id.span;
            body.stmts.insert(0, f::let_decl(id, None, span));
        }
        self.scopes.pop();
        self.fns.pop();
    }
}

fn has_props_decl(name: &Ident, span: Span) -> Stmt {
    let obj = f::ident("obj", span);
    let props = f::ident("props", span);
    let prop = f::ident("prop", span);

    // function (prop) { return prop in obj; }
    let filter_fn = Expr::Fn(FnExpr {
        span,
        ident: None,
        function: Function {
            span,
            params: vec![Pat::Ident(prop.clone())],
            body: f::block(
                vec![f::return_stmt(
                    Some(f::bin(
                        BinaryOp::In,
                        f::ident_expr(prop),
                        f::ident_expr(obj.clone()),
                        span,
                    )),
                    span,
                )],
                span,
            ),
            is_async: false,
            is_generator: false,
            return_type: None,
        },
    });

    // props.filter(...).length === props.length
    let filtered_len = f::member(
        f::method_call(f::ident_expr(props.clone()), "filter", vec![filter_fn], span),
        f::ident("length", span),
    );
    let full_len = f::member(f::ident_expr(props.clone()), f::ident("length", span));
    let len_eq = f::bin(BinaryOp::EqEqEq, filtered_len, full_len, span);

    // typeof obj === "object" || typeof obj === "function"
    let type_of = |value: &str| {
        f::bin(
            BinaryOp::EqEqEq,
            Expr::Unary(UnaryExpr {
                span,
                op: UnaryOp::TypeOf,
                arg: Box::new(f::ident_expr(obj.clone())),
            }),
            f::str_expr(value, span),
            span,
        )
    };
    let type_ok = f::bin(
        BinaryOp::LogicalOr,
        type_of("object"),
        type_of("function"),
        span,
    );

    let not_null = f::bin(
        BinaryOp::NotEq,
        f::ident_expr(obj.clone()),
        f::null(span),
        span,
    );
    let ret = f::bin(
        BinaryOp::LogicalAnd,
        f::bin(BinaryOp::LogicalAnd, not_null, type_ok, span),
        len_eq,
        span,
    );

    Stmt::FnDecl(FnDecl {
        span,
        ident: f::locate_at(name.clone(), span),
        function: Function {
            span,
            params: vec![Pat::Ident(obj), Pat::Ident(props)],
            body: f::block(vec![f::return_stmt(Some(ret), span)], span),
            is_async: false,
            is_generator: false,
            return_type: None,
        },
    })
}

impl VisitMut for Desugarer<'_> {
    fn visit_mut_program(&mut self, program: &mut Program) {
        scope::collect_bindings(&mut self.scopes, &program.body);
        self.visit_mut_stmts(&mut program.body);
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        if self.error.is_some() {
            return;
        }
        let mut out = Vec::with_capacity(stmts.len());
        for mut stmt in stmts.drain(..) {
            if self.error.is_none() {
                let saved = std::mem::take(&mut self.pending_before);
                self.visit_mut_stmt(&mut stmt);
                let pending = self.drain_pending_visited();
                out.extend(pending);
                self.pending_before = saved;
            }
            out.push(stmt);
        }
        *stmts = out;
    }

    fn visit_mut_block_stmt(&mut self, block: &mut BlockStmt) {
        if self.error.is_some() {
            return;
        }
        self.scopes.push(ScopeKind::Block);
        scope::collect_bindings(&mut self.scopes, &block.stmts);
        self.visit_mut_stmts(&mut block.stmts);
        self.scopes.pop();
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        if self.error.is_some() {
            return;
        }

        // Enter rewrites: loop until the slot holds a standard kind.
        loop {
            if self.error.is_some() {
                return;
            }
            match stmt {
                Stmt::LsRangeLoop(_) => {
                    let Stmt::LsRangeLoop(node) = self.take_stmt(stmt) else {
                        unreachable!()
                    };
                    *stmt = loops::desugar_range_loop(node, &mut self.scopes);
                }
                Stmt::LsArrayIter(_) => {
                    let Stmt::LsArrayIter(node) = self.take_stmt(stmt) else {
                        unreachable!()
                    };
                    let mut prelude = Vec::new();
                    *stmt = loops::desugar_array_iter(node, &mut self.scopes, &mut prelude);
                    self.pending_before.extend(prelude);
                }
                Stmt::LsObjectIter(_) => {
                    let Stmt::LsObjectIter(node) = self.take_stmt(stmt) else {
                        unreachable!()
                    };
                    let mut prelude = Vec::new();
                    *stmt = loops::desugar_object_iter(node, &mut self.scopes, &mut prelude);
                    self.pending_before.extend(prelude);
                }
                Stmt::LsNamedArrowDecl(_) => {
                    let Stmt::LsNamedArrowDecl(node) = self.take_stmt(stmt) else {
                        unreachable!()
                    };
                    *stmt = functions::desugar_named_arrow_decl(node);
                }
                Stmt::LsMemberArrow(_) => {
                    let Stmt::LsMemberArrow(node) = self.take_stmt(stmt) else {
                        unreachable!()
                    };
                    *stmt = functions::desugar_member_arrow(node);
                }
                // Statement-position match lowers to an inline chain.
                Stmt::Expr(es) if matches!(es.expr.as_ref(), Expr::LsMatch(_)) => {
                    let taken = std::mem::replace(&mut *es.expr, f::null(Span::MISSING));
                    let Expr::LsMatch(node) = taken else { unreachable!() };
                    let (prelude, chain) = match_expr::desugar_match_stmt(self, node);
                    self.pending_before.extend(prelude);
                    *stmt = chain;
                }
                Stmt::VarDecl(decl) => {
                    self.check_implicit_shadow(decl);
                    break;
                }
                _ => break,
            }
        }
        if self.error.is_some() {
            return;
        }

        // Walk, managing the scopes statements introduce and keeping
        // hoisted statements inside bare branch positions.
        match stmt {
            Stmt::If(n) => {
                self.visit_mut_expr(&mut n.test);
                self.visit_branch_stmt(&mut n.cons);
                if let Some(alt) = &mut n.alt {
                    self.visit_branch_stmt(alt);
                }
            }
            Stmt::For(n) => {
                self.scopes.push(ScopeKind::Block);
                match &mut n.init {
                    Some(VarDeclOrExpr::VarDecl(decl)) => {
                        self.register_decl_names(decl);
                        self.visit_var_decl_parts(decl);
                    }
                    Some(VarDeclOrExpr::Expr(init)) => self.visit_mut_expr(init),
                    None => {}
                }
                if let Some(test) = &mut n.test {
                    self.visit_mut_expr(test);
                }
                if let Some(update) = &mut n.update {
                    self.visit_mut_expr(update);
                }
                self.visit_branch_stmt(&mut n.body);
                self.scopes.pop();
            }
            Stmt::ForIn(_) | Stmt::ForOf(_) => {
                let (left, right, body) = match stmt {
                    Stmt::ForIn(n) => (&mut n.left, &mut n.right, &mut n.body),
                    Stmt::ForOf(n) => (&mut n.left, &mut n.right, &mut n.body),
                    _ => unreachable!(),
                };
                loops::normalize_for_head(left);
                self.scopes.push(ScopeKind::Block);
                match left {
                    ForHead::VarDecl(decl) => {
                        self.register_decl_names(decl);
                        self.visit_var_decl_parts(decl);
                    }
                    ForHead::Pat(pat) => self.visit_mut_pat(pat),
                }
                self.visit_mut_expr(right);
                self.visit_branch_stmt(body);
                self.scopes.pop();
            }
            Stmt::While(n) => {
                self.visit_mut_expr(&mut n.test);
                self.visit_branch_stmt(&mut n.body);
            }
            Stmt::DoWhile(n) => {
                self.visit_branch_stmt(&mut n.body);
                self.visit_mut_expr(&mut n.test);
            }
            Stmt::Try(n) => {
                self.visit_mut_block_stmt(&mut n.block);
                if let Some(handler) = &mut n.handler {
                    self.scopes.push(ScopeKind::Block);
                    if let Some(param) = &mut handler.param {
                        let mut names = Vec::new();
                        param.bound_names(&mut names);
                        let names: Vec<String> =
                            names.into_iter().map(|id| id.sym.clone()).collect();
                        for name in names {
                            self.scopes.register(&name, BindingKind::CatchParam);
                        }
                        self.visit_mut_pat(param);
                    }
                    self.visit_mut_block_stmt(&mut handler.body);
                    self.scopes.pop();
                }
                if let Some(finalizer) = &mut n.finalizer {
                    self.visit_mut_block_stmt(finalizer);
                }
            }
            _ => visit::walk_mut_stmt(self, stmt),
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if self.error.is_some() {
            return;
        }

        // Enter rewrites.
        loop {
            if self.error.is_some() {
                return;
            }
            if safe::spine_has_safe(expr) {
                let taken = self.take_expr(expr);
                *expr = safe::fold_safe_chain(taken, self);
                continue;
            }
            match expr {
                Expr::LsSafeAwait(_) => {
                    let Expr::LsSafeAwait(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    *expr = safe::desugar_safe_await(node, self);
                }
                Expr::LsArrayComprehension(_) => {
                    let Expr::LsArrayComprehension(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    let in_async = self.in_async_fn();
                    match comprehension::desugar_array_comprehension(
                        node,
                        &mut self.scopes,
                        self.registry,
                        in_async,
                    ) {
                        Ok(replacement) => *expr = replacement,
                        Err(diag) => {
                            self.fail(diag);
                            return;
                        }
                    }
                }
                Expr::LsObjectComprehension(_) => {
                    let Expr::LsObjectComprehension(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    let in_async = self.in_async_fn();
                    match comprehension::desugar_object_comprehension(
                        node,
                        &mut self.scopes,
                        self.registry,
                        in_async,
                    ) {
                        Ok(replacement) => *expr = replacement,
                        Err(diag) => {
                            self.fail(diag);
                            return;
                        }
                    }
                }
                Expr::LsIfExpr(_) => {
                    let Expr::LsIfExpr(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    match if_expr::desugar_if_expr(node) {
                        Ok(replacement) => *expr = replacement,
                        Err(diag) => {
                            self.fail(diag);
                            return;
                        }
                    }
                }
                Expr::LsMatch(_) => {
                    let Expr::LsMatch(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    let in_async = self.in_async_fn();
                    *expr = match_expr::desugar_match_expr(self, node, in_async);
                }
                Expr::LsNamedArrow(_) => {
                    let Expr::LsNamedArrow(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    *expr = functions::desugar_named_arrow_expr(node);
                }
                Expr::LsArrow(_) => {
                    let Expr::LsArrow(node) = self.take_expr(expr) else {
                        unreachable!()
                    };
                    *expr = functions::desugar_ls_arrow(node);
                }
                Expr::Await(node) => {
                    safe::spread_await_over_array(node);
                    break;
                }
                Expr::Object(_) => {
                    functions::bind_object_methods(expr, self);
                    break;
                }
                _ => break,
            }
        }
        if self.error.is_some() {
            return;
        }

        // Enter analyses.
        match expr {
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::Ident(id) => self.record_stdlib_ref(id),
            _ => {}
        }
        if self.error.is_some() {
            return;
        }

        // Walk, managing function contexts.
        match expr {
            Expr::Arrow(arrow) => {
                let ctx = FnCtx {
                    is_async: arrow.is_async,
                    skip_implicit_return: false,
                    pending_decls: Vec::new(),
                };
                match &mut arrow.body {
                    BlockStmtOrExpr::Block(block) => {
                        self.visit_fn_body(&mut arrow.params, block, ctx);
                    }
                    BlockStmtOrExpr::Expr(body) => {
                        self.fns.push(ctx);
                        self.scopes.push(ScopeKind::Function);
                        self.register_params(&arrow.params);
                        for param in arrow.params.iter_mut() {
                            self.visit_mut_pat(param);
                        }
                        self.visit_mut_expr(body);
                        let pending = std::mem::take(
                            &mut self.fns.last_mut().expect("just pushed").pending_decls,
                        );
                        if !pending.is_empty() {
                            // Hoists force the body into block form.
                            let span = body.span();
                            let value = std::mem::replace(&mut **body, f::null(Span::MISSING));
                            let mut stmts: Vec<Stmt> = pending
                                .into_iter()
                                .map(|id| {
                                    let id_span = id.span;
                                    f::let_decl(id, None, id_span)
                                })
                                .collect();
                            stmts.push(f::return_stmt(Some(value), span));
                            arrow.body = BlockStmtOrExpr::Block(f::block(stmts, span));
                        }
                        self.scopes.pop();
                        self.fns.pop();
                    }
                }
            }
            Expr::Object(lit) => {
                for prop in &mut lit.props {
                    match prop {
                        Prop::KeyValue(kv) => {
                            if let PropName::Computed(c) = &mut kv.key {
                                self.visit_mut_expr(&mut c.expr);
                            }
                            self.visit_mut_expr(&mut kv.value);
                        }
                        Prop::Shorthand(_) => {}
                        Prop::Method(method) => {
                            if let PropName::Computed(c) = &mut method.key {
                                self.visit_mut_expr(&mut c.expr);
                            }
                            if method.kind == MethodKind::Setter {
                                self.next_fn_skips_return = true;
                            }
                            self.visit_mut_function(&mut method.function);
                        }
                        Prop::Spread(spread) => self.visit_mut_expr(&mut spread.expr),
                    }
                }
            }
            _ => visit::walk_mut_expr(self, expr),
        }
        if self.error.is_some() {
            return;
        }

        // Exit rewrites: tilde calls see fully settled children.
        if let Expr::LsTildeCall(_) = expr {
            let Expr::LsTildeCall(node) = self.take_expr(expr) else {
                unreachable!()
            };
            *expr = tilde::desugar_tilde_call(node);
        }
    }

    fn visit_mut_function(&mut self, function: &mut Function) {
        if self.error.is_some() {
            return;
        }
        let skip = std::mem::take(&mut self.next_fn_skips_return)
            || matches!(&function.return_type, Some(rt) if rt.sym == "void");
        let ctx = FnCtx {
            is_async: function.is_async,
            skip_implicit_return: skip,
            pending_decls: Vec::new(),
        };
        let mut params = std::mem::take(&mut function.params);
        self.visit_fn_body(&mut params, &mut function.body, ctx);
        function.params = params;
    }

    fn visit_mut_class(&mut self, class: &mut Class) {
        if self.error.is_some() {
            return;
        }
        if let Some(super_class) = &mut class.super_class {
            self.visit_mut_expr(super_class);
        }
        for member in &mut class.body {
            match member {
                ClassMember::Constructor(ctor) => {
                    let ctx = FnCtx {
                        is_async: false,
                        skip_implicit_return: true,
                        pending_decls: Vec::new(),
                    };
                    let mut params = std::mem::take(&mut ctor.params);
                    self.visit_fn_body(&mut params, &mut ctor.body, ctx);
                    ctor.params = params;
                }
                ClassMember::Method(method) => {
                    if let PropName::Computed(c) = &mut method.key {
                        self.visit_mut_expr(&mut c.expr);
                    }
                    if method.kind == MethodKind::Setter {
                        self.next_fn_skips_return = true;
                    }
                    self.visit_mut_function(&mut method.function);
                }
            }
        }
        // Exit: constructor-time binding and `super` normalization.
        if self.error.is_none() {
            if let Err(diag) = functions::normalize_class(class, self) {
                self.fail(diag);
            }
        }
    }
}
