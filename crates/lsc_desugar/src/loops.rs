//! Loop desugaring: counted range loops, array-source iteration,
//! object-source iteration, and `for-in`/`for-of` head normalization.
//!
//! Array and object sources that are not bare identifiers are hoisted
//! into a `const` evaluated exactly once, before the loop. The array
//! form also snapshots `.length`; the object form snapshots own keys via
//! `Object.keys`, which delivers own-properties-only iteration in
//! insertion order.

use lsc_ast::*;

use crate::factory as f;
use crate::scope::{BindingKind, ScopeStack};

/// `for i from a til b` → `for (let i = a; i < b; i++) body`
/// (`<=` when inclusive). A missing index is synthesized.
pub fn desugar_range_loop(node: LsRangeLoop, scopes: &mut ScopeStack) -> Stmt {
    let span = node.span;
    let id = node
        .id
        .unwrap_or_else(|| f::ident(scopes.fresh("i"), span.collapse_to_start()));
    scopes.register(&id.sym, BindingKind::Let);

    let start_span = node.start.span();
    let init = f::var_decl(
        VarDeclKind::Let,
        Pat::Ident(id.clone()),
        Some(*node.start),
        start_span,
    );
    let op = if node.inclusive {
        BinaryOp::LtEq
    } else {
        BinaryOp::Lt
    };
    let end_span = node.end.span();
    let test = f::bin(op, f::ident_expr(id.clone()), *node.end, end_span);
    let update = f::incr(f::ident_expr(id.clone()), span);

    Stmt::For(ForStmt {
        span,
        init: Some(VarDeclOrExpr::VarDecl(init)),
        test: Some(Box::new(test)),
        update: Some(Box::new(update)),
        body: node.body,
    })
}

/// Hoist a non-identifier source into `const _name = <expr>;` pushed onto
/// `prelude`, and return the identifier to iterate over.
fn hoist_source(
    source: Expr,
    hint: &str,
    scopes: &mut ScopeStack,
    prelude: &mut Vec<Stmt>,
) -> Ident {
    match source {
        Expr::Ident(id) => id,
        other => {
            let span = other.span();
            let id = f::ident(scopes.fresh(hint), span);
            scopes.register(&id.sym, BindingKind::Synthetic);
            prelude.push(f::const_decl(id.clone(), other, span));
            id
        }
    }
}

fn ensure_block(body: Box<Stmt>) -> BlockStmt {
    match *body {
        Stmt::Block(block) => block,
        other => {
            let span = other.span();
            BlockStmt {
                span,
                stmts: vec![other],
            }
        }
    }
}

/// `for idx i, elem x in arr` → indexed for-loop over a hoisted source
/// with a length snapshot; the element binding becomes the first body
/// statement.
pub fn desugar_array_iter(
    node: LsArrayIter,
    scopes: &mut ScopeStack,
    prelude: &mut Vec<Stmt>,
) -> Stmt {
    let span = node.span;
    let arr = hoist_source(*node.array, "arr", scopes, prelude);

    let len = f::ident(scopes.fresh("len"), arr.span);
    scopes.register(&len.sym, BindingKind::Synthetic);
    prelude.push(f::const_decl(
        len.clone(),
        f::member(f::ident_expr(arr.clone()), f::ident("length", arr.span)),
        arr.span,
    ));

    let idx = node
        .idx
        .unwrap_or_else(|| f::ident(scopes.fresh("i"), span.collapse_to_start()));
    scopes.register(&idx.sym, BindingKind::Let);

    let mut body = ensure_block(node.body);
    if let Some(elem) = node.elem {
        scopes.register(&elem.sym, BindingKind::Const);
        let elem_span = elem.span;
        body.stmts.insert(
            0,
            f::const_decl(
                elem,
                f::computed_member(f::ident_expr(arr.clone()), f::ident_expr(f::clone_at(&idx, elem_span))),
                elem_span,
            ),
        );
    }

    let init = f::var_decl(
        VarDeclKind::Let,
        Pat::Ident(idx.clone()),
        Some(f::num(0.0, idx.span)),
        idx.span,
    );
    let test = f::bin(
        BinaryOp::Lt,
        f::ident_expr(idx.clone()),
        f::ident_expr(len),
        span,
    );
    let update = f::incr(f::ident_expr(idx), span);

    Stmt::For(ForStmt {
        span,
        init: Some(VarDeclOrExpr::VarDecl(init)),
        test: Some(Box::new(test)),
        update: Some(Box::new(update)),
        body: Box::new(Stmt::Block(body)),
    })
}

/// `for key k, val v in obj` → cursor over an `Object.keys` snapshot.
/// Own keys only, insertion order; mutation during the loop is invisible.
pub fn desugar_object_iter(
    node: LsObjectIter,
    scopes: &mut ScopeStack,
    prelude: &mut Vec<Stmt>,
) -> Stmt {
    let span = node.span;
    let obj = hoist_source(*node.object, "obj", scopes, prelude);

    let keys = f::ident(scopes.fresh("keys"), obj.span);
    scopes.register(&keys.sym, BindingKind::Synthetic);
    prelude.push(f::const_decl(
        keys.clone(),
        f::method_call(
            f::ident_expr(f::ident("Object", obj.span)),
            "keys",
            vec![f::ident_expr(obj.clone())],
            obj.span,
        ),
        obj.span,
    ));

    let idx = f::ident(scopes.fresh("i"), span.collapse_to_start());
    scopes.register(&idx.sym, BindingKind::Let);

    let mut body = ensure_block(node.body);
    let mut head = Vec::new();
    // The value binding reads through the key; bind the key first when
    // both are present.
    let key_ref = match &node.key {
        Some(key) => f::ident_expr(key.clone()),
        None => f::computed_member(
            f::ident_expr(keys.clone()),
            f::ident_expr(f::clone_at(&idx, span)),
        ),
    };
    if let Some(key) = node.key {
        scopes.register(&key.sym, BindingKind::Const);
        let key_span = key.span;
        head.push(f::const_decl(
            key,
            f::computed_member(
                f::ident_expr(keys.clone()),
                f::ident_expr(f::clone_at(&idx, key_span)),
            ),
            key_span,
        ));
    }
    if let Some(value) = node.value {
        scopes.register(&value.sym, BindingKind::Const);
        let value_span = value.span;
        head.push(f::const_decl(
            value,
            f::computed_member(f::ident_expr(obj.clone()), key_ref),
            value_span,
        ));
    }
    body.stmts.splice(0..0, head);

    let init = f::var_decl(
        VarDeclKind::Let,
        Pat::Ident(idx.clone()),
        Some(f::num(0.0, idx.span)),
        idx.span,
    );
    let test = f::bin(
        BinaryOp::Lt,
        f::ident_expr(idx.clone()),
        f::member(f::ident_expr(keys), f::ident("length", span)),
        span,
    );
    let update = f::incr(f::ident_expr(idx), span);

    Stmt::For(ForStmt {
        span,
        init: Some(VarDeclOrExpr::VarDecl(init)),
        test: Some(Box::new(test)),
        update: Some(Box::new(update)),
        body: Box::new(Stmt::Block(body)),
    })
}

/// `for x in xs` / `for x of xs` with a bare pattern on the left gets a
/// `const` declaration wrapped around it.
pub fn normalize_for_head(left: &mut ForHead) {
    if let ForHead::Pat(pat) = left {
        let span = pat.span();
        let pat = std::mem::replace(pat, Pat::Ident(f::ident("_", span)));
        *left = ForHead::VarDecl(f::var_decl(VarDeclKind::Const, pat, None, span));
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

    fn empty_body(n: u32) -> Box<Stmt> {
        Box::new(Stmt::Block(BlockStmt {
            span: sp(n),
            stmts: vec![],
        }))
    }

    #[test]
    fn range_loop_uses_lt_or_lteq() {
        for (inclusive, op) in [(false, BinaryOp::Lt), (true, BinaryOp::LtEq)] {
            let mut scopes = ScopeStack::new();
            let node = LsRangeLoop {
                span: sp(0),
                id: Some(f::ident("i", sp(1))),
                start: Box::new(f::num(0.0, sp(2))),
                end: Box::new(f::num(10.0, sp(3))),
                inclusive,
                body: empty_body(4),
            };
            let Stmt::For(for_stmt) = desugar_range_loop(node, &mut scopes) else {
                panic!("expected a for statement")
            };
            let Expr::Bin(test) = *for_stmt.test.unwrap() else {
                panic!("expected a binary test")
            };
            assert_eq!(test.op, op);
        }
    }

    #[test]
    fn computed_array_source_is_hoisted_once() {
        let mut scopes = ScopeStack::new();
        let mut prelude = Vec::new();
        let node = LsArrayIter {
            span: sp(0),
            idx: None,
            elem: Some(f::ident("x", sp(1))),
            array: Box::new(f::call(
                f::ident_expr(f::ident("Array", sp(2))),
                vec![f::num(3.0, sp(3))],
                sp(2),
            )),
            body: empty_body(4),
        };
        let stmt = desugar_array_iter(node, &mut scopes, &mut prelude);
        // One hoisted source, one hoisted length.
        assert_eq!(prelude.len(), 2);
        let Stmt::VarDecl(decl) = &prelude[0] else {
            panic!("expected the hoisted source")
        };
        assert_eq!(decl.kind, VarDeclKind::Const);
        assert!(matches!(
            prelude[1],
            Stmt::VarDecl(ref d) if d.kind == VarDeclKind::Const
        ));
        // The loop body starts with the element binding.
        let Stmt::For(for_stmt) = stmt else {
            panic!("expected a for statement")
        };
        let Stmt::Block(body) = *for_stmt.body else {
            panic!("expected a block body")
        };
        assert!(matches!(&body.stmts[0], Stmt::VarDecl(d) if d.kind == VarDeclKind::Const));
    }

    #[test]
    fn identifier_array_source_is_not_hoisted() {
        let mut scopes = ScopeStack::new();
        let mut prelude = Vec::new();
        let node = LsArrayIter {
            span: sp(0),
            idx: Some(f::ident("i", sp(1))),
            elem: None,
            array: Box::new(f::ident_expr(f::ident("xs", sp(2)))),
            body: empty_body(3),
        };
        desugar_array_iter(node, &mut scopes, &mut prelude);
        // Only the length snapshot.
        assert_eq!(prelude.len(), 1);
    }

    #[test]
    fn object_iter_snapshots_own_keys() {
        let mut scopes = ScopeStack::new();
        let mut prelude = Vec::new();
        let node = LsObjectIter {
            span: sp(0),
            key: Some(f::ident("k", sp(1))),
            value: Some(f::ident("v", sp(2))),
            object: Box::new(f::ident_expr(f::ident("obj", sp(3)))),
            body: empty_body(4),
        };
        let stmt = desugar_object_iter(node, &mut scopes, &mut prelude);
        // `const _keys = Object.keys(obj);`
        assert_eq!(prelude.len(), 1);
        let Stmt::VarDecl(decl) = &prelude[0] else {
            panic!("expected the keys snapshot")
        };
        let init = decl.decls[0].init.as_ref().unwrap();
        let Expr::Call(call) = init.as_ref() else {
            panic!("expected Object.keys(...)")
        };
        let Expr::Member(m) = call.callee.as_ref() else {
            panic!("expected a member callee")
        };
        assert_eq!(m.obj.as_ident().unwrap().sym, "Object");
        // Key and value bindings lead the body.
        let Stmt::For(for_stmt) = stmt else {
            panic!("expected a for statement")
        };
        let Stmt::Block(body) = *for_stmt.body else {
            panic!("expected a block body")
        };
        assert_eq!(body.stmts.len(), 2);
    }

    #[test]
    fn for_of_head_gets_const_wrapped() {
        let mut left = ForHead::Pat(Pat::Ident(f::ident("x", sp(0))));
        normalize_for_head(&mut left);
        let ForHead::VarDecl(decl) = left else {
            panic!("expected a const declaration")
        };
        assert_eq!(decl.kind, VarDeclKind::Const);
        assert!(decl.decls[0].init.is_none());
    }
}
