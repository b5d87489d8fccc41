//! Type registry: one declared shape per node kind.
//!
//! The enums of [`crate::ast`] fix each kind's fields at compile time;
//! the registry carries what the type system cannot: category
//! memberships (so "is this a loop / a function" is a declared relation,
//! not a match sprinkled through the rules), child-edge names, and
//! structural validators run over parser-provided trees.
//!
//! The registry is populated exactly once, before any traversal, and is
//! read-only afterwards; registering the same kind twice is a defect and
//! trips an assertion.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::ast::*;
use crate::ext::*;
use crate::visit::{self, VisitMut};

/// Flat fingerprint of every node kind, standard and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    // statements
    ExprStmt,
    BlockStmt,
    VarDecl,
    FnDecl,
    ClassDecl,
    ReturnStmt,
    IfStmt,
    ForStmt,
    ForInStmt,
    ForOfStmt,
    WhileStmt,
    DoWhileStmt,
    TryStmt,
    ThrowStmt,
    BreakStmt,
    ContinueStmt,
    EmptyStmt,
    ImportDecl,
    // expressions
    Ident,
    NumLit,
    StrLit,
    BoolLit,
    NullLit,
    ThisExpr,
    SuperExpr,
    ArrayLit,
    ObjectLit,
    FnExpr,
    ArrowExpr,
    ClassExpr,
    CallExpr,
    NewExpr,
    MemberExpr,
    CondExpr,
    AssignExpr,
    BinExpr,
    UnaryExpr,
    UpdateExpr,
    AwaitExpr,
    YieldExpr,
    SeqExpr,
    // patterns
    ArrayPat,
    ObjectPat,
    AssignPat,
    RestPat,
    // extension kinds
    LsRangeLoop,
    LsArrayIter,
    LsObjectIter,
    LsArrayComprehension,
    LsObjectComprehension,
    LsTildeCall,
    LsNamedArrowDecl,
    LsNamedArrowExpr,
    LsMemberArrow,
    LsArrowExpr,
    LsIfExpr,
    LsSafeMember,
    LsSafeAwait,
    LsMatchExpr,
}

impl NodeKind {
    /// True for kinds the output tree must not contain.
    pub fn is_extension(self) -> bool {
        matches!(
            self,
            NodeKind::LsRangeLoop
                | NodeKind::LsArrayIter
                | NodeKind::LsObjectIter
                | NodeKind::LsArrayComprehension
                | NodeKind::LsObjectComprehension
                | NodeKind::LsTildeCall
                | NodeKind::LsNamedArrowDecl
                | NodeKind::LsNamedArrowExpr
                | NodeKind::LsMemberArrow
                | NodeKind::LsArrowExpr
                | NodeKind::LsIfExpr
                | NodeKind::LsSafeMember
                | NodeKind::LsSafeAwait
                | NodeKind::LsMatchExpr
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Statement,
    Expression,
    Declaration,
    Loop,
    ForX,
    Function,
    Pattern,
    Literal,
    Extension,
}

/// A reference to any node, for validators.
#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pat(&'a Pat),
}

pub type ValidatorFn = fn(&TypeRegistry, NodeRef<'_>) -> Result<(), String>;

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub name: &'static str,
    pub required: bool,
}

/// Declaration of one node kind's shape.
pub struct KindSpec {
    kind: NodeKind,
    categories: Vec<Category>,
    edges: Vec<Edge>,
    inherits: Option<NodeKind>,
    validate: Option<ValidatorFn>,
}

impl KindSpec {
    pub fn new(kind: NodeKind) -> KindSpec {
        KindSpec {
            kind,
            categories: Vec::new(),
            edges: Vec::new(),
            inherits: None,
            validate: None,
        }
    }

    pub fn categories(mut self, cats: &[Category]) -> KindSpec {
        self.categories.extend_from_slice(cats);
        self
    }

    pub fn edge(mut self, name: &'static str) -> KindSpec {
        self.edges.push(Edge {
            name,
            required: true,
        });
        self
    }

    pub fn optional_edge(mut self, name: &'static str) -> KindSpec {
        self.edges.push(Edge {
            name,
            required: false,
        });
        self
    }

    /// Single-level inheritance: copy the base kind's shape at
    /// registration time. Categories given here are added on top; edges
    /// given here replace the base's.
    pub fn inherits(mut self, base: NodeKind) -> KindSpec {
        self.inherits = Some(base);
        self
    }

    pub fn validator(mut self, f: ValidatorFn) -> KindSpec {
        self.validate = Some(f);
        self
    }
}

struct KindDef {
    categories: Vec<Category>,
    edges: Vec<Edge>,
    validate: Option<ValidatorFn>,
}

pub struct TypeRegistry {
    kinds: HashMap<NodeKind, KindDef>,
}

impl TypeRegistry {
    fn empty() -> TypeRegistry {
        TypeRegistry {
            kinds: HashMap::new(),
        }
    }

    /// Register a kind. Double registration is a programming error.
    pub fn define(&mut self, spec: KindSpec) {
        let KindSpec {
            kind,
            mut categories,
            mut edges,
            inherits,
            mut validate,
        } = spec;

        if let Some(base) = inherits {
            let base_def = self
                .kinds
                .get(&base)
                .unwrap_or_else(|| panic!("inherited kind {base:?} not registered before {kind:?}"));
            let mut merged = base_def.categories.clone();
            for cat in categories {
                if !merged.contains(&cat) {
                    merged.push(cat);
                }
            }
            categories = merged;
            if edges.is_empty() {
                edges = base_def.edges.clone();
            }
            if validate.is_none() {
                validate = base_def.validate;
            }
        }

        let prev = self.kinds.insert(
            kind,
            KindDef {
                categories,
                edges,
                validate,
            },
        );
        assert!(prev.is_none(), "node kind {kind:?} registered twice");
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    pub fn is(&self, kind: NodeKind, category: Category) -> bool {
        self.kinds
            .get(&kind)
            .map(|def| def.categories.contains(&category))
            .unwrap_or(false)
    }

    pub fn is_loop(&self, kind: NodeKind) -> bool {
        self.is(kind, Category::Loop)
    }

    pub fn is_function(&self, kind: NodeKind) -> bool {
        self.is(kind, Category::Function)
    }

    pub fn edges_of(&self, kind: NodeKind) -> &[Edge] {
        self.kinds
            .get(&kind)
            .map(|def| def.edges.as_slice())
            .unwrap_or(&[])
    }

    /// The registry with every standard and extension kind declared.
    pub fn standard() -> TypeRegistry {
        use Category::*;

        let mut r = TypeRegistry::empty();

        r.define(KindSpec::new(NodeKind::Program).edge("body"));

        // Statements.
        r.define(
            KindSpec::new(NodeKind::ExprStmt)
                .categories(&[Statement])
                .edge("expr"),
        );
        r.define(
            KindSpec::new(NodeKind::BlockStmt)
                .categories(&[Statement])
                .edge("stmts"),
        );
        r.define(
            KindSpec::new(NodeKind::VarDecl)
                .categories(&[Statement, Declaration])
                .edge("decls")
                .validator(validate_var_decl),
        );
        r.define(
            KindSpec::new(NodeKind::FnDecl)
                .categories(&[Statement, Declaration, Function])
                .edge("ident")
                .edge("function"),
        );
        r.define(
            KindSpec::new(NodeKind::ClassDecl)
                .categories(&[Statement, Declaration])
                .edge("ident")
                .edge("class"),
        );
        r.define(
            KindSpec::new(NodeKind::ReturnStmt)
                .categories(&[Statement])
                .optional_edge("arg"),
        );
        r.define(
            KindSpec::new(NodeKind::IfStmt)
                .categories(&[Statement])
                .edge("test")
                .edge("cons")
                .optional_edge("alt"),
        );
        r.define(
            KindSpec::new(NodeKind::ForStmt)
                .categories(&[Statement, Loop])
                .optional_edge("init")
                .optional_edge("test")
                .optional_edge("update")
                .edge("body"),
        );
        r.define(
            KindSpec::new(NodeKind::ForInStmt)
                .categories(&[Statement, Loop, ForX])
                .edge("left")
                .edge("right")
                .edge("body"),
        );
        r.define(KindSpec::new(NodeKind::ForOfStmt).inherits(NodeKind::ForInStmt));
        r.define(
            KindSpec::new(NodeKind::WhileStmt)
                .categories(&[Statement, Loop])
                .edge("test")
                .edge("body"),
        );
        r.define(
            KindSpec::new(NodeKind::DoWhileStmt)
                .categories(&[Statement, Loop])
                .edge("body")
                .edge("test"),
        );
        r.define(
            KindSpec::new(NodeKind::TryStmt)
                .categories(&[Statement])
                .edge("block")
                .optional_edge("handler")
                .optional_edge("finalizer"),
        );
        r.define(
            KindSpec::new(NodeKind::ThrowStmt)
                .categories(&[Statement])
                .edge("arg"),
        );
        r.define(KindSpec::new(NodeKind::BreakStmt).categories(&[Statement]));
        r.define(KindSpec::new(NodeKind::ContinueStmt).categories(&[Statement]));
        r.define(KindSpec::new(NodeKind::EmptyStmt).categories(&[Statement]));
        r.define(
            KindSpec::new(NodeKind::ImportDecl)
                .categories(&[Statement, Declaration])
                .edge("specifiers")
                .edge("src"),
        );

        // Expressions.
        r.define(KindSpec::new(NodeKind::Ident).categories(&[Expression, Pattern]));
        r.define(KindSpec::new(NodeKind::NumLit).categories(&[Expression, Literal]));
        r.define(KindSpec::new(NodeKind::StrLit).categories(&[Expression, Literal]));
        r.define(KindSpec::new(NodeKind::BoolLit).categories(&[Expression, Literal]));
        r.define(KindSpec::new(NodeKind::NullLit).categories(&[Expression, Literal]));
        r.define(KindSpec::new(NodeKind::ThisExpr).categories(&[Expression]));
        r.define(KindSpec::new(NodeKind::SuperExpr).categories(&[Expression]));
        r.define(
            KindSpec::new(NodeKind::ArrayLit)
                .categories(&[Expression])
                .edge("elems"),
        );
        r.define(
            KindSpec::new(NodeKind::ObjectLit)
                .categories(&[Expression])
                .edge("props"),
        );
        r.define(
            KindSpec::new(NodeKind::FnExpr)
                .categories(&[Expression, Function])
                .optional_edge("ident")
                .edge("function"),
        );
        r.define(
            KindSpec::new(NodeKind::ArrowExpr)
                .categories(&[Expression, Function])
                .edge("params")
                .edge("body"),
        );
        r.define(
            KindSpec::new(NodeKind::ClassExpr)
                .categories(&[Expression])
                .optional_edge("ident")
                .edge("class"),
        );
        r.define(
            KindSpec::new(NodeKind::CallExpr)
                .categories(&[Expression])
                .edge("callee")
                .edge("args"),
        );
        r.define(KindSpec::new(NodeKind::NewExpr).inherits(NodeKind::CallExpr));
        r.define(
            KindSpec::new(NodeKind::MemberExpr)
                .categories(&[Expression])
                .edge("obj")
                .edge("prop"),
        );
        r.define(
            KindSpec::new(NodeKind::CondExpr)
                .categories(&[Expression])
                .edge("test")
                .edge("cons")
                .edge("alt"),
        );
        r.define(
            KindSpec::new(NodeKind::AssignExpr)
                .categories(&[Expression])
                .edge("left")
                .edge("right")
                .validator(validate_assign),
        );
        r.define(
            KindSpec::new(NodeKind::BinExpr)
                .categories(&[Expression])
                .edge("left")
                .edge("right"),
        );
        r.define(
            KindSpec::new(NodeKind::UnaryExpr)
                .categories(&[Expression])
                .edge("arg"),
        );
        r.define(
            KindSpec::new(NodeKind::UpdateExpr)
                .categories(&[Expression])
                .edge("arg"),
        );
        r.define(
            KindSpec::new(NodeKind::AwaitExpr)
                .categories(&[Expression])
                .edge("arg"),
        );
        r.define(
            KindSpec::new(NodeKind::YieldExpr)
                .categories(&[Expression])
                .optional_edge("arg"),
        );
        r.define(
            KindSpec::new(NodeKind::SeqExpr)
                .categories(&[Expression])
                .edge("exprs"),
        );

        // Patterns.
        r.define(
            KindSpec::new(NodeKind::ArrayPat)
                .categories(&[Pattern])
                .edge("elems"),
        );
        r.define(
            KindSpec::new(NodeKind::ObjectPat)
                .categories(&[Pattern])
                .edge("props"),
        );
        r.define(
            KindSpec::new(NodeKind::AssignPat)
                .categories(&[Pattern])
                .edge("left")
                .edge("right"),
        );
        r.define(
            KindSpec::new(NodeKind::RestPat)
                .categories(&[Pattern])
                .edge("arg"),
        );

        // Extension kinds.
        r.define(
            KindSpec::new(NodeKind::LsRangeLoop)
                .categories(&[Statement, Loop, Extension])
                .optional_edge("id")
                .edge("start")
                .edge("end")
                .edge("body"),
        );
        r.define(
            KindSpec::new(NodeKind::LsArrayIter)
                .categories(&[Statement, Loop, ForX, Extension])
                .optional_edge("idx")
                .optional_edge("elem")
                .edge("array")
                .edge("body")
                .validator(validate_array_iter),
        );
        r.define(
            KindSpec::new(NodeKind::LsObjectIter)
                .categories(&[Statement, Loop, ForX, Extension])
                .optional_edge("key")
                .optional_edge("value")
                .edge("object")
                .edge("body")
                .validator(validate_object_iter),
        );
        r.define(
            KindSpec::new(NodeKind::LsArrayComprehension)
                .categories(&[Expression, Extension])
                .edge("loop")
                .validator(validate_comprehension),
        );
        r.define(
            KindSpec::new(NodeKind::LsObjectComprehension)
                .inherits(NodeKind::LsArrayComprehension),
        );
        r.define(
            KindSpec::new(NodeKind::LsTildeCall)
                .categories(&[Expression, Extension])
                .edge("left")
                .edge("callee")
                .edge("args"),
        );
        r.define(
            KindSpec::new(NodeKind::LsNamedArrowDecl)
                .categories(&[Statement, Declaration, Function, Extension])
                .edge("ident")
                .edge("function"),
        );
        r.define(
            KindSpec::new(NodeKind::LsNamedArrowExpr)
                .inherits(NodeKind::LsNamedArrowDecl)
                .categories(&[Expression]),
        );
        r.define(
            KindSpec::new(NodeKind::LsMemberArrow)
                .categories(&[Statement, Function, Extension])
                .edge("target")
                .edge("function"),
        );
        r.define(
            KindSpec::new(NodeKind::LsArrowExpr)
                .categories(&[Expression, Function, Extension])
                .edge("function"),
        );
        r.define(
            KindSpec::new(NodeKind::LsIfExpr)
                .categories(&[Expression, Extension])
                .edge("test")
                .edge("cons")
                .optional_edge("alt"),
        );
        r.define(
            KindSpec::new(NodeKind::LsSafeMember)
                .categories(&[Expression, Extension])
                .edge("obj")
                .edge("prop"),
        );
        r.define(
            KindSpec::new(NodeKind::LsSafeAwait)
                .categories(&[Expression, Extension])
                .edge("arg"),
        );
        r.define(
            KindSpec::new(NodeKind::LsMatchExpr)
                .categories(&[Expression, Extension])
                .edge("discriminant")
                .edge("arms")
                .validator(validate_match),
        );

        r
    }

    /// The process-wide registry, built on first use and immutable after.
    pub fn global() -> &'static TypeRegistry {
        static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(TypeRegistry::standard)
    }

    /// Structural validation of a parser-provided tree: run every kind's
    /// validator over every node. Returns all messages, not just the
    /// first, since this guards an external handoff.
    pub fn validate_program(&self, program: &mut Program) -> Result<(), Vec<String>> {
        let mut v = ValidateVisitor {
            registry: self,
            errors: Vec::new(),
        };
        v.visit_mut_program(program);
        if v.errors.is_empty() {
            Ok(())
        } else {
            Err(v.errors)
        }
    }
}

fn validate_var_decl(_r: &TypeRegistry, node: NodeRef<'_>) -> Result<(), String> {
    if let NodeRef::Stmt(Stmt::VarDecl(decl)) = node {
        if decl.decls.is_empty() {
            return Err("variable declaration with no declarators".into());
        }
    }
    Ok(())
}

fn validate_assign(_r: &TypeRegistry, node: NodeRef<'_>) -> Result<(), String> {
    if let NodeRef::Expr(Expr::Assign(assign)) = node {
        if assign.op != AssignOp::Assign {
            if let AssignTarget::Pat(_) = assign.left {
                return Err("compound assignment cannot target a pattern".into());
            }
        }
    }
    Ok(())
}

fn validate_array_iter(_r: &TypeRegistry, node: NodeRef<'_>) -> Result<(), String> {
    if let NodeRef::Stmt(Stmt::LsArrayIter(iter)) = node {
        if iter.idx.is_none() && iter.elem.is_none() {
            return Err("array iteration must bind an index or an element".into());
        }
    }
    Ok(())
}

fn validate_object_iter(_r: &TypeRegistry, node: NodeRef<'_>) -> Result<(), String> {
    if let NodeRef::Stmt(Stmt::LsObjectIter(iter)) = node {
        if iter.key.is_none() && iter.value.is_none() {
            return Err("object iteration must bind a key or a value".into());
        }
    }
    Ok(())
}

fn validate_comprehension(r: &TypeRegistry, node: NodeRef<'_>) -> Result<(), String> {
    let loop_stmt = match node {
        NodeRef::Expr(Expr::LsArrayComprehension(c)) => &c.loop_stmt,
        NodeRef::Expr(Expr::LsObjectComprehension(c)) => &c.loop_stmt,
        _ => return Ok(()),
    };
    if !r.is_loop(loop_stmt.kind()) {
        return Err(format!(
            "comprehension must wrap a loop, found {:?}",
            loop_stmt.kind()
        ));
    }
    Ok(())
}

fn validate_match(_r: &TypeRegistry, node: NodeRef<'_>) -> Result<(), String> {
    if let NodeRef::Expr(Expr::LsMatch(m)) = node {
        for arm in &m.arms {
            if arm.tests.is_empty() && arm.pattern.is_none() {
                return Err("match alternative has neither value checks nor a pattern".into());
            }
        }
    }
    Ok(())
}

struct ValidateVisitor<'a> {
    registry: &'a TypeRegistry,
    errors: Vec<String>,
}

impl ValidateVisitor<'_> {
    fn check(&mut self, kind: NodeKind, node: NodeRef<'_>, span: crate::span::Span) {
        if let Some(def) = self.registry.kinds.get(&kind) {
            if let Some(validate) = def.validate {
                if let Err(msg) = validate(self.registry, node) {
                    self.errors.push(format!("{span}: {msg}"));
                }
            }
        } else {
            self.errors.push(format!("{span}: unregistered kind {kind:?}"));
        }
    }
}

impl VisitMut for ValidateVisitor<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        self.check(stmt.kind(), NodeRef::Stmt(stmt), stmt.span());
        visit::walk_mut_stmt(self, stmt);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        self.check(expr.kind(), NodeRef::Expr(expr), expr.span());
        visit::walk_mut_expr(self, expr);
    }

    fn visit_mut_pat(&mut self, pat: &mut Pat) {
        self.check(pat.kind(), NodeRef::Pat(pat), pat.span());
        visit::walk_mut_pat(self, pat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_registration_is_a_defect() {
        let mut r = TypeRegistry::standard();
        r.define(KindSpec::new(NodeKind::CallExpr).categories(&[Category::Expression]));
    }

    #[test]
    fn categories_are_declared_relations() {
        let r = TypeRegistry::standard();
        assert!(r.is_loop(NodeKind::ForStmt));
        assert!(r.is_loop(NodeKind::LsArrayIter));
        assert!(r.is_loop(NodeKind::LsRangeLoop));
        assert!(!r.is_loop(NodeKind::IfStmt));
        assert!(r.is_function(NodeKind::ArrowExpr));
        assert!(r.is_function(NodeKind::LsNamedArrowDecl));
    }

    #[test]
    fn inheritance_copies_shape() {
        let r = TypeRegistry::standard();
        // ForOf inherits ForIn's edges and categories.
        assert!(r.is(NodeKind::ForOfStmt, Category::ForX));
        let edges: Vec<_> = r.edges_of(NodeKind::ForOfStmt).iter().map(|e| e.name).collect();
        assert_eq!(edges, vec!["left", "right", "body"]);
        // NamedArrowExpr adds Expression on top of the decl's shape.
        assert!(r.is(NodeKind::LsNamedArrowExpr, Category::Expression));
        assert!(r.is(NodeKind::LsNamedArrowExpr, Category::Function));
    }

    #[test]
    fn validators_reject_malformed_shapes() {
        let r = TypeRegistry::standard();
        let mut program = Program {
            span: Span::MISSING,
            body: vec![Stmt::LsObjectIter(LsObjectIter {
                span: Span::MISSING,
                key: None,
                value: None,
                object: Box::new(Expr::Ident(Ident {
                    span: Span::MISSING,
                    sym: "obj".into(),
                })),
                body: Box::new(Stmt::Block(BlockStmt {
                    span: Span::MISSING,
                    stmts: vec![],
                })),
            })],
        };
        let errors = r.validate_program(&mut program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("key or a value"));
    }
}
