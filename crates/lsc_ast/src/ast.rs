//! Standard JavaScript AST nodes.
//!
//! Node and field names follow the usual ECMAScript AST vocabulary so the
//! JSON handed over by the parser and handed on to the code generator
//! reads the same on both sides of this engine. Statements, expressions
//! and patterns are closed tagged unions over *all* node kinds; the
//! extension kinds of [`crate::ext`] live in the same enums, which is what
//! lets one traversal and one registry cover the whole tree.

use serde::{Deserialize, Serialize};

use crate::ext::*;
use crate::registry::NodeKind;
use crate::span::Span;

// --- Program ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub span: Span,
    pub body: Vec<Stmt>,
}

// --- Statements ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Expr(ExprStmt),
    Block(BlockStmt),
    VarDecl(VarDecl),
    FnDecl(FnDecl),
    ClassDecl(ClassDecl),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    ForOf(ForOfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Empty(EmptyStmt),
    Import(ImportDecl),
    // LightScript extension statements
    LsRangeLoop(LsRangeLoop),
    LsArrayIter(LsArrayIter),
    LsObjectIter(LsObjectIter),
    LsNamedArrowDecl(LsNamedArrowDecl),
    LsMemberArrow(LsMemberArrow),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub span: Span,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStmt {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarDeclKind {
    Var,
    Let,
    Const,
}

impl VarDeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarDeclKind::Var => "var",
            VarDeclKind::Let => "let",
            VarDeclKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub span: Span,
    pub kind: VarDeclKind,
    pub decls: Vec<VarDeclarator>,
    /// True when the parser synthesized this declaration from a bare
    /// `x = value` statement. Subject to the shadowing diagnostic.
    #[serde(default)]
    pub implicit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclarator {
    pub span: Span,
    pub name: Pat,
    #[serde(default)]
    pub init: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDecl {
    pub span: Span,
    pub ident: Ident,
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub span: Span,
    #[serde(default)]
    pub arg: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub span: Span,
    pub test: Box<Expr>,
    pub cons: Box<Stmt>,
    #[serde(default)]
    pub alt: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VarDeclOrExpr {
    VarDecl(VarDecl),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub span: Span,
    #[serde(default)]
    pub init: Option<VarDeclOrExpr>,
    #[serde(default)]
    pub test: Option<Box<Expr>>,
    #[serde(default)]
    pub update: Option<Box<Expr>>,
    pub body: Box<Stmt>,
}

/// Left-hand side of a `for-in`/`for-of` head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForHead {
    VarDecl(VarDecl),
    Pat(Pat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForInStmt {
    pub span: Span,
    pub left: ForHead,
    pub right: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForOfStmt {
    pub span: Span,
    pub left: ForHead,
    pub right: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub span: Span,
    pub test: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoWhileStmt {
    pub span: Span,
    pub body: Box<Stmt>,
    pub test: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub span: Span,
    pub block: BlockStmt,
    #[serde(default)]
    pub handler: Option<CatchClause>,
    #[serde(default)]
    pub finalizer: Option<BlockStmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub span: Span,
    #[serde(default)]
    pub param: Option<Pat>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowStmt {
    pub span: Span,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub span: Span,
    pub local: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub span: Span,
    pub specifiers: Vec<ImportSpecifier>,
    pub src: StrLit,
}

// --- Classes ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub span: Span,
    pub ident: Ident,
    pub class: Class,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassExpr {
    pub span: Span,
    #[serde(default)]
    pub ident: Option<Ident>,
    pub class: Class,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub span: Span,
    #[serde(default)]
    pub super_class: Option<Box<Expr>>,
    pub body: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassMember {
    Constructor(Constructor),
    Method(ClassMethod),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    pub span: Span,
    pub params: Vec<Pat>,
    pub body: BlockStmt,
    /// True when the constructor body was not authored with curly braces
    /// (terse form); only such constructors accept `super` injection.
    #[serde(default)]
    pub implicit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMethod {
    pub span: Span,
    pub key: PropName,
    pub function: Function,
    pub kind: MethodKind,
    #[serde(default)]
    pub is_static: bool,
    /// Fat-arrow method: requires constructor-time `this` binding.
    #[serde(default)]
    pub bound: bool,
}

// --- Expressions ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Ident(Ident),
    Num(NumLit),
    Str(StrLit),
    Bool(BoolLit),
    Null(NullLit),
    This(ThisExpr),
    Super(SuperExpr),
    Array(ArrayLit),
    Object(ObjectLit),
    Fn(FnExpr),
    Arrow(ArrowExpr),
    Class(ClassExpr),
    Call(CallExpr),
    New(NewExpr),
    Member(MemberExpr),
    Cond(CondExpr),
    Assign(AssignExpr),
    Bin(BinExpr),
    Unary(UnaryExpr),
    Update(UpdateExpr),
    Await(AwaitExpr),
    Yield(YieldExpr),
    Seq(SeqExpr),
    // LightScript extension expressions
    LsSafeMember(LsSafeMember),
    LsSafeAwait(LsSafeAwait),
    LsTildeCall(LsTildeCall),
    LsArrayComprehension(LsArrayComprehension),
    LsObjectComprehension(LsObjectComprehension),
    LsIfExpr(LsIfExpr),
    LsMatch(LsMatchExpr),
    LsNamedArrow(LsNamedArrowExpr),
    LsArrow(LsArrowExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub span: Span,
    pub sym: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumLit {
    pub span: Span,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrLit {
    pub span: Span,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolLit {
    pub span: Span,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullLit {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThisExpr {
    pub span: Span,
}

/// Only valid as the callee of a constructor's `super(...)` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperExpr {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprOrSpread {
    #[serde(default)]
    pub spread: bool,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLit {
    pub span: Span,
    pub elems: Vec<ExprOrSpread>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLit {
    pub span: Span,
    pub props: Vec<Prop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Prop {
    KeyValue(KeyValueProp),
    Shorthand(ShorthandProp),
    Method(ObjectMethod),
    Spread(SpreadProp),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueProp {
    pub span: Span,
    pub key: PropName,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShorthandProp {
    pub span: Span,
    pub key: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMethod {
    pub span: Span,
    pub key: PropName,
    pub function: Function,
    pub kind: MethodKind,
    /// Fat-arrow method: requires post-construction `this` binding.
    #[serde(default)]
    pub bound: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadProp {
    pub span: Span,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropName {
    Ident(Ident),
    Str(StrLit),
    Num(NumLit),
    Computed(ComputedPropName),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedPropName {
    pub span: Span,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub span: Span,
    pub params: Vec<Pat>,
    pub body: BlockStmt,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,
    /// Optional declared return type name; only `"void"` is meaningful
    /// to this engine (it suppresses implicit returns).
    #[serde(default)]
    pub return_type: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnExpr {
    pub span: Span,
    #[serde(default)]
    pub ident: Option<Ident>,
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockStmtOrExpr {
    Block(BlockStmt),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowExpr {
    pub span: Span,
    pub params: Vec<Pat>,
    pub body: BlockStmtOrExpr,
    #[serde(default)]
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub span: Span,
    pub callee: Box<Expr>,
    pub args: Vec<ExprOrSpread>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpr {
    pub span: Span,
    pub callee: Box<Expr>,
    pub args: Vec<ExprOrSpread>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberProp {
    Ident(Ident),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpr {
    pub span: Span,
    pub obj: Box<Expr>,
    pub prop: MemberProp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondExpr {
    pub span: Span,
    pub test: Box<Expr>,
    pub cons: Box<Expr>,
    pub alt: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignTarget {
    Ident(Ident),
    Member(MemberExpr),
    Pat(Pat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignExpr {
    pub span: Span,
    pub op: AssignOp,
    pub left: AssignTarget,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LogicalAnd,
    LogicalOr,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::EqEq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::EqEqEq => "===",
            BinaryOp::NotEqEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinExpr {
    pub span: Span,
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub span: Span,
    pub op: UnaryOp,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Incr,
    Decr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpr {
    pub span: Span,
    pub op: UpdateOp,
    #[serde(default)]
    pub prefix: bool,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwaitExpr {
    pub span: Span,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldExpr {
    pub span: Span,
    #[serde(default)]
    pub arg: Option<Box<Expr>>,
    #[serde(default)]
    pub delegate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqExpr {
    pub span: Span,
    pub exprs: Vec<Expr>,
}

// --- Patterns ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pat {
    Ident(Ident),
    Array(ArrayPat),
    Object(ObjectPat),
    Assign(AssignPat),
    Rest(RestPat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayPat {
    pub span: Span,
    /// `None` entries are elision holes (`[a, , b]`).
    pub elems: Vec<Option<Pat>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPat {
    pub span: Span,
    pub props: Vec<ObjectPatProp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectPatProp {
    /// `{ key: <pat> }`
    KeyValue(KeyValuePatProp),
    /// `{ key }` or `{ key = default }`
    Shorthand(ShorthandPatProp),
    /// `{ ...rest }`
    Rest(RestPat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePatProp {
    pub span: Span,
    pub key: Ident,
    pub value: Box<Pat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShorthandPatProp {
    pub span: Span,
    pub key: Ident,
    #[serde(default)]
    pub default: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignPat {
    pub span: Span,
    pub left: Box<Pat>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestPat {
    pub span: Span,
    pub arg: Box<Pat>,
}

// --- Kind and span accessors ---

impl Stmt {
    pub fn kind(&self) -> NodeKind {
        match self {
            Stmt::Expr(_) => NodeKind::ExprStmt,
            Stmt::Block(_) => NodeKind::BlockStmt,
            Stmt::VarDecl(_) => NodeKind::VarDecl,
            Stmt::FnDecl(_) => NodeKind::FnDecl,
            Stmt::ClassDecl(_) => NodeKind::ClassDecl,
            Stmt::Return(_) => NodeKind::ReturnStmt,
            Stmt::If(_) => NodeKind::IfStmt,
            Stmt::For(_) => NodeKind::ForStmt,
            Stmt::ForIn(_) => NodeKind::ForInStmt,
            Stmt::ForOf(_) => NodeKind::ForOfStmt,
            Stmt::While(_) => NodeKind::WhileStmt,
            Stmt::DoWhile(_) => NodeKind::DoWhileStmt,
            Stmt::Try(_) => NodeKind::TryStmt,
            Stmt::Throw(_) => NodeKind::ThrowStmt,
            Stmt::Break(_) => NodeKind::BreakStmt,
            Stmt::Continue(_) => NodeKind::ContinueStmt,
            Stmt::Empty(_) => NodeKind::EmptyStmt,
            Stmt::Import(_) => NodeKind::ImportDecl,
            Stmt::LsRangeLoop(_) => NodeKind::LsRangeLoop,
            Stmt::LsArrayIter(_) => NodeKind::LsArrayIter,
            Stmt::LsObjectIter(_) => NodeKind::LsObjectIter,
            Stmt::LsNamedArrowDecl(_) => NodeKind::LsNamedArrowDecl,
            Stmt::LsMemberArrow(_) => NodeKind::LsMemberArrow,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(n) => n.span,
            Stmt::Block(n) => n.span,
            Stmt::VarDecl(n) => n.span,
            Stmt::FnDecl(n) => n.span,
            Stmt::ClassDecl(n) => n.span,
            Stmt::Return(n) => n.span,
            Stmt::If(n) => n.span,
            Stmt::For(n) => n.span,
            Stmt::ForIn(n) => n.span,
            Stmt::ForOf(n) => n.span,
            Stmt::While(n) => n.span,
            Stmt::DoWhile(n) => n.span,
            Stmt::Try(n) => n.span,
            Stmt::Throw(n) => n.span,
            Stmt::Break(n) => n.span,
            Stmt::Continue(n) => n.span,
            Stmt::Empty(n) => n.span,
            Stmt::Import(n) => n.span,
            Stmt::LsRangeLoop(n) => n.span,
            Stmt::LsArrayIter(n) => n.span,
            Stmt::LsObjectIter(n) => n.span,
            Stmt::LsNamedArrowDecl(n) => n.span,
            Stmt::LsMemberArrow(n) => n.span,
        }
    }

    pub fn set_span(&mut self, span: Span) {
        match self {
            Stmt::Expr(n) => n.span = span,
            Stmt::Block(n) => n.span = span,
            Stmt::VarDecl(n) => n.span = span,
            Stmt::FnDecl(n) => n.span = span,
            Stmt::ClassDecl(n) => n.span = span,
            Stmt::Return(n) => n.span = span,
            Stmt::If(n) => n.span = span,
            Stmt::For(n) => n.span = span,
            Stmt::ForIn(n) => n.span = span,
            Stmt::ForOf(n) => n.span = span,
            Stmt::While(n) => n.span = span,
            Stmt::DoWhile(n) => n.span = span,
            Stmt::Try(n) => n.span = span,
            Stmt::Throw(n) => n.span = span,
            Stmt::Break(n) => n.span = span,
            Stmt::Continue(n) => n.span = span,
            Stmt::Empty(n) => n.span = span,
            Stmt::Import(n) => n.span = span,
            Stmt::LsRangeLoop(n) => n.span = span,
            Stmt::LsArrayIter(n) => n.span = span,
            Stmt::LsObjectIter(n) => n.span = span,
            Stmt::LsNamedArrowDecl(n) => n.span = span,
            Stmt::LsMemberArrow(n) => n.span = span,
        }
    }
}

impl Expr {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Ident(_) => NodeKind::Ident,
            Expr::Num(_) => NodeKind::NumLit,
            Expr::Str(_) => NodeKind::StrLit,
            Expr::Bool(_) => NodeKind::BoolLit,
            Expr::Null(_) => NodeKind::NullLit,
            Expr::This(_) => NodeKind::ThisExpr,
            Expr::Super(_) => NodeKind::SuperExpr,
            Expr::Array(_) => NodeKind::ArrayLit,
            Expr::Object(_) => NodeKind::ObjectLit,
            Expr::Fn(_) => NodeKind::FnExpr,
            Expr::Arrow(_) => NodeKind::ArrowExpr,
            Expr::Class(_) => NodeKind::ClassExpr,
            Expr::Call(_) => NodeKind::CallExpr,
            Expr::New(_) => NodeKind::NewExpr,
            Expr::Member(_) => NodeKind::MemberExpr,
            Expr::Cond(_) => NodeKind::CondExpr,
            Expr::Assign(_) => NodeKind::AssignExpr,
            Expr::Bin(_) => NodeKind::BinExpr,
            Expr::Unary(_) => NodeKind::UnaryExpr,
            Expr::Update(_) => NodeKind::UpdateExpr,
            Expr::Await(_) => NodeKind::AwaitExpr,
            Expr::Yield(_) => NodeKind::YieldExpr,
            Expr::Seq(_) => NodeKind::SeqExpr,
            Expr::LsSafeMember(_) => NodeKind::LsSafeMember,
            Expr::LsSafeAwait(_) => NodeKind::LsSafeAwait,
            Expr::LsTildeCall(_) => NodeKind::LsTildeCall,
            Expr::LsArrayComprehension(_) => NodeKind::LsArrayComprehension,
            Expr::LsObjectComprehension(_) => NodeKind::LsObjectComprehension,
            Expr::LsIfExpr(_) => NodeKind::LsIfExpr,
            Expr::LsMatch(_) => NodeKind::LsMatchExpr,
            Expr::LsNamedArrow(_) => NodeKind::LsNamedArrowExpr,
            Expr::LsArrow(_) => NodeKind::LsArrowExpr,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(n) => n.span,
            Expr::Num(n) => n.span,
            Expr::Str(n) => n.span,
            Expr::Bool(n) => n.span,
            Expr::Null(n) => n.span,
            Expr::This(n) => n.span,
            Expr::Super(n) => n.span,
            Expr::Array(n) => n.span,
            Expr::Object(n) => n.span,
            Expr::Fn(n) => n.span,
            Expr::Arrow(n) => n.span,
            Expr::Class(n) => n.span,
            Expr::Call(n) => n.span,
            Expr::New(n) => n.span,
            Expr::Member(n) => n.span,
            Expr::Cond(n) => n.span,
            Expr::Assign(n) => n.span,
            Expr::Bin(n) => n.span,
            Expr::Unary(n) => n.span,
            Expr::Update(n) => n.span,
            Expr::Await(n) => n.span,
            Expr::Yield(n) => n.span,
            Expr::Seq(n) => n.span,
            Expr::LsSafeMember(n) => n.span,
            Expr::LsSafeAwait(n) => n.span,
            Expr::LsTildeCall(n) => n.span,
            Expr::LsArrayComprehension(n) => n.span,
            Expr::LsObjectComprehension(n) => n.span,
            Expr::LsIfExpr(n) => n.span,
            Expr::LsMatch(n) => n.span,
            Expr::LsNamedArrow(n) => n.span,
            Expr::LsArrow(n) => n.span,
        }
    }

    pub fn set_span(&mut self, span: Span) {
        match self {
            Expr::Ident(n) => n.span = span,
            Expr::Num(n) => n.span = span,
            Expr::Str(n) => n.span = span,
            Expr::Bool(n) => n.span = span,
            Expr::Null(n) => n.span = span,
            Expr::This(n) => n.span = span,
            Expr::Super(n) => n.span = span,
            Expr::Array(n) => n.span = span,
            Expr::Object(n) => n.span = span,
            Expr::Fn(n) => n.span = span,
            Expr::Arrow(n) => n.span = span,
            Expr::Class(n) => n.span = span,
            Expr::Call(n) => n.span = span,
            Expr::New(n) => n.span = span,
            Expr::Member(n) => n.span = span,
            Expr::Cond(n) => n.span = span,
            Expr::Assign(n) => n.span = span,
            Expr::Bin(n) => n.span = span,
            Expr::Unary(n) => n.span = span,
            Expr::Update(n) => n.span = span,
            Expr::Await(n) => n.span = span,
            Expr::Yield(n) => n.span = span,
            Expr::Seq(n) => n.span = span,
            Expr::LsSafeMember(n) => n.span = span,
            Expr::LsSafeAwait(n) => n.span = span,
            Expr::LsTildeCall(n) => n.span = span,
            Expr::LsArrayComprehension(n) => n.span = span,
            Expr::LsObjectComprehension(n) => n.span = span,
            Expr::LsIfExpr(n) => n.span = span,
            Expr::LsMatch(n) => n.span = span,
            Expr::LsNamedArrow(n) => n.span = span,
            Expr::LsArrow(n) => n.span = span,
        }
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }
}

impl Pat {
    pub fn kind(&self) -> NodeKind {
        match self {
            Pat::Ident(_) => NodeKind::Ident,
            Pat::Array(_) => NodeKind::ArrayPat,
            Pat::Object(_) => NodeKind::ObjectPat,
            Pat::Assign(_) => NodeKind::AssignPat,
            Pat::Rest(_) => NodeKind::RestPat,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Pat::Ident(n) => n.span,
            Pat::Array(n) => n.span,
            Pat::Object(n) => n.span,
            Pat::Assign(n) => n.span,
            Pat::Rest(n) => n.span,
        }
    }

    /// Collect every identifier this pattern binds, in source order.
    pub fn bound_names<'a>(&'a self, out: &mut Vec<&'a Ident>) {
        match self {
            Pat::Ident(id) => out.push(id),
            Pat::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    elem.bound_names(out);
                }
            }
            Pat::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => kv.value.bound_names(out),
                        ObjectPatProp::Shorthand(s) => out.push(&s.key),
                        ObjectPatProp::Rest(r) => r.arg.bound_names(out),
                    }
                }
            }
            Pat::Assign(a) => a.left.bound_names(out),
            Pat::Rest(r) => r.arg.bound_names(out),
        }
    }
}
