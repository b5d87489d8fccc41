//! Compact JavaScript emitter for the standard AST subset.
//!
//! Stands in for the external code generator in the CLI and the test
//! harness: deterministic two-space-indent output, minimal parentheses
//! by operator precedence, statement-leading `function`/`{`/`class`
//! disambiguated with parentheses. Encountering an extension node kind
//! is an error; run the desugarer (and its consistency checker) first.

use lsc_ast::*;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("cannot emit non-standard node kind {kind:?}")]
    Unsupported { kind: NodeKind },
}

type Result<T> = std::result::Result<T, CodegenError>;

/// Emit a whole program as JavaScript text.
pub fn emit_program(program: &Program) -> Result<String> {
    let mut e = Emitter {
        out: String::new(),
        indent: 0,
    };
    for stmt in &program.body {
        e.emit_stmt(stmt)?;
    }
    Ok(e.out)
}

// Operator precedence levels, loosely following the ECMAScript table.
const PREC_SEQ: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_COND: u8 = 3;
const PREC_OR: u8 = 4;
const PREC_AND: u8 = 5;
const PREC_EQ: u8 = 9;
const PREC_REL: u8 = 10;
const PREC_ADD: u8 = 12;
const PREC_MUL: u8 = 13;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 16;
const PREC_CALL: u8 = 18;
const PREC_PRIMARY: u8 = 20;

fn bin_prec(op: BinaryOp) -> u8 {
    use BinaryOp::*;
    match op {
        LogicalOr => PREC_OR,
        LogicalAnd => PREC_AND,
        EqEq | NotEq | EqEqEq | NotEqEq => PREC_EQ,
        Lt | LtEq | Gt | GtEq | In | InstanceOf => PREC_REL,
        Add | Sub => PREC_ADD,
        Mul | Div | Mod => PREC_MUL,
    }
}

fn prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Seq(_) => PREC_SEQ,
        Expr::Assign(_) | Expr::Arrow(_) | Expr::Yield(_) => PREC_ASSIGN,
        Expr::Cond(_) => PREC_COND,
        Expr::Bin(b) => bin_prec(b.op),
        Expr::Unary(_) | Expr::Await(_) => PREC_UNARY,
        Expr::Update(u) => {
            if u.prefix {
                PREC_UNARY
            } else {
                PREC_POSTFIX
            }
        }
        Expr::Call(_) | Expr::Member(_) | Expr::New(_) => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

/// Would this expression start a statement with `function`, `class`,
/// `{`, or an object-pattern target?
fn starts_ambiguously(expr: &Expr) -> bool {
    match expr {
        Expr::Fn(_) | Expr::Object(_) | Expr::Class(_) => true,
        Expr::Call(n) => starts_ambiguously(&n.callee),
        Expr::Member(n) => starts_ambiguously(&n.obj),
        Expr::Bin(n) => starts_ambiguously(&n.left),
        Expr::Cond(n) => starts_ambiguously(&n.test),
        Expr::Seq(n) => n.exprs.first().map(starts_ambiguously).unwrap_or(false),
        Expr::Update(n) if !n.prefix => starts_ambiguously(&n.arg),
        Expr::Assign(n) => match &n.left {
            AssignTarget::Ident(_) => false,
            AssignTarget::Member(m) => starts_ambiguously(&m.obj),
            AssignTarget::Pat(p) => matches!(p, Pat::Object(_)),
        },
        _ => false,
    }
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn fmt_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Emitter {
    out: String,
    indent: usize,
}

impl Emitter {
    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    // --- Statements ---

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(n) => {
                self.pad();
                if starts_ambiguously(&n.expr) {
                    self.push("(");
                    self.emit_expr(&n.expr, PREC_SEQ)?;
                    self.push(")");
                } else {
                    self.emit_expr(&n.expr, PREC_SEQ)?;
                }
                self.push(";\n");
            }
            Stmt::Block(n) => {
                self.pad();
                self.emit_block(n)?;
                self.push("\n");
            }
            Stmt::VarDecl(n) => {
                self.pad();
                self.emit_var_decl(n)?;
                self.push(";\n");
            }
            Stmt::FnDecl(n) => {
                self.pad();
                self.emit_fn_keyword(&n.function);
                self.push(&n.ident.sym);
                self.emit_fn_rest(&n.function)?;
                self.push("\n");
            }
            Stmt::ClassDecl(n) => {
                self.pad();
                self.push("class ");
                self.push(&n.ident.sym);
                self.emit_class_rest(&n.class)?;
                self.push("\n");
            }
            Stmt::Return(n) => {
                self.pad();
                match &n.arg {
                    Some(arg) => {
                        self.push("return ");
                        self.emit_expr(arg, PREC_SEQ)?;
                        self.push(";\n");
                    }
                    None => self.push("return;\n"),
                }
            }
            Stmt::If(n) => {
                self.pad();
                self.emit_if(n)?;
                self.push("\n");
            }
            Stmt::For(n) => {
                self.pad();
                self.push("for (");
                match &n.init {
                    Some(VarDeclOrExpr::VarDecl(decl)) => self.emit_var_decl(decl)?,
                    Some(VarDeclOrExpr::Expr(expr)) => self.emit_expr(expr, PREC_SEQ)?,
                    None => {}
                }
                self.push("; ");
                if let Some(test) = &n.test {
                    self.emit_expr(test, PREC_SEQ)?;
                }
                self.push("; ");
                if let Some(update) = &n.update {
                    self.emit_expr(update, PREC_SEQ)?;
                }
                self.push(") ");
                self.emit_body_as_block(&n.body)?;
                self.push("\n");
            }
            Stmt::ForIn(n) => {
                self.emit_for_x("in", &n.left, &n.right, &n.body)?;
            }
            Stmt::ForOf(n) => {
                self.emit_for_x("of", &n.left, &n.right, &n.body)?;
            }
            Stmt::While(n) => {
                self.pad();
                self.push("while (");
                self.emit_expr(&n.test, PREC_SEQ)?;
                self.push(") ");
                self.emit_body_as_block(&n.body)?;
                self.push("\n");
            }
            Stmt::DoWhile(n) => {
                self.pad();
                self.push("do ");
                self.emit_body_as_block(&n.body)?;
                self.push(" while (");
                self.emit_expr(&n.test, PREC_SEQ)?;
                self.push(");\n");
            }
            Stmt::Try(n) => {
                self.pad();
                self.push("try ");
                self.emit_block(&n.block)?;
                if let Some(handler) = &n.handler {
                    match &handler.param {
                        Some(param) => {
                            self.push(" catch (");
                            self.emit_pat(param)?;
                            self.push(") ");
                        }
                        None => self.push(" catch "),
                    }
                    self.emit_block(&handler.body)?;
                }
                if let Some(finalizer) = &n.finalizer {
                    self.push(" finally ");
                    self.emit_block(finalizer)?;
                }
                self.push("\n");
            }
            Stmt::Throw(n) => {
                self.pad();
                self.push("throw ");
                self.emit_expr(&n.arg, PREC_SEQ)?;
                self.push(";\n");
            }
            Stmt::Break(_) => {
                self.pad();
                self.push("break;\n");
            }
            Stmt::Continue(_) => {
                self.pad();
                self.push("continue;\n");
            }
            Stmt::Empty(_) => {
                self.pad();
                self.push(";\n");
            }
            Stmt::Import(n) => {
                self.pad();
                self.push("import { ");
                for (i, spec) in n.specifiers.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push(&spec.local.sym);
                }
                self.push(" } from ");
                self.push(&fmt_str(&n.src.value));
                self.push(";\n");
            }
            other => {
                return Err(CodegenError::Unsupported {
                    kind: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn emit_for_x(&mut self, word: &str, left: &ForHead, right: &Expr, body: &Stmt) -> Result<()> {
        self.pad();
        self.push("for (");
        match left {
            ForHead::VarDecl(decl) => self.emit_var_decl(decl)?,
            ForHead::Pat(pat) => self.emit_pat(pat)?,
        }
        self.push(" ");
        self.push(word);
        self.push(" ");
        self.emit_expr(right, PREC_SEQ)?;
        self.push(") ");
        self.emit_body_as_block(body)?;
        self.push("\n");
        Ok(())
    }

    fn emit_if(&mut self, n: &IfStmt) -> Result<()> {
        self.push("if (");
        self.emit_expr(&n.test, PREC_SEQ)?;
        self.push(") ");
        self.emit_body_as_block(&n.cons)?;
        if let Some(alt) = &n.alt {
            self.push(" else ");
            if let Stmt::If(chained) = alt.as_ref() {
                self.emit_if(chained)?;
            } else {
                self.emit_body_as_block(alt)?;
            }
        }
        Ok(())
    }

    /// Branch bodies always print in braces.
    fn emit_body_as_block(&mut self, body: &Stmt) -> Result<()> {
        match body {
            Stmt::Block(block) => self.emit_block(block),
            other => {
                self.push("{\n");
                self.indent += 1;
                self.emit_stmt(other)?;
                self.indent -= 1;
                self.pad();
                self.push("}");
                Ok(())
            }
        }
    }

    fn emit_block(&mut self, block: &BlockStmt) -> Result<()> {
        if block.stmts.is_empty() {
            self.push("{}");
            return Ok(());
        }
        self.push("{\n");
        self.indent += 1;
        for stmt in &block.stmts {
            self.emit_stmt(stmt)?;
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
        Ok(())
    }

    /// `const x = 1, y = 2` with no trailing semicolon, for `for` heads.
    fn emit_var_decl(&mut self, decl: &VarDecl) -> Result<()> {
        self.push(decl.kind.as_str());
        self.push(" ");
        for (i, declarator) in decl.decls.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.emit_pat(&declarator.name)?;
            if let Some(init) = &declarator.init {
                self.push(" = ");
                self.emit_expr(init, PREC_ASSIGN)?;
            }
        }
        Ok(())
    }

    fn emit_fn_keyword(&mut self, function: &Function) {
        if function.is_async {
            self.push("async ");
        }
        self.push("function");
        if function.is_generator {
            self.push("*");
        }
        self.push(" ");
    }

    fn emit_fn_rest(&mut self, function: &Function) -> Result<()> {
        self.push("(");
        self.emit_params(&function.params)?;
        self.push(") ");
        self.emit_block(&function.body)
    }

    fn emit_params(&mut self, params: &[Pat]) -> Result<()> {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.emit_pat(param)?;
        }
        Ok(())
    }

    fn emit_class_rest(&mut self, class: &Class) -> Result<()> {
        if let Some(super_class) = &class.super_class {
            self.push(" extends ");
            self.emit_expr(super_class, PREC_CALL)?;
        }
        if class.body.is_empty() {
            self.push(" {}");
            return Ok(());
        }
        self.push(" {\n");
        self.indent += 1;
        for member in &class.body {
            self.pad();
            match member {
                ClassMember::Constructor(ctor) => {
                    self.push("constructor(");
                    self.emit_params(&ctor.params)?;
                    self.push(") ");
                    self.emit_block(&ctor.body)?;
                    self.push("\n");
                }
                ClassMember::Method(m) => {
                    if m.is_static {
                        self.push("static ");
                    }
                    match m.kind {
                        MethodKind::Getter => self.push("get "),
                        MethodKind::Setter => self.push("set "),
                        MethodKind::Method => {}
                    }
                    if m.function.is_async {
                        self.push("async ");
                    }
                    if m.function.is_generator {
                        self.push("*");
                    }
                    self.emit_prop_name(&m.key)?;
                    self.push("(");
                    self.emit_params(&m.function.params)?;
                    self.push(") ");
                    self.emit_block(&m.function.body)?;
                    self.push("\n");
                }
            }
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
        Ok(())
    }

    fn emit_prop_name(&mut self, name: &PropName) -> Result<()> {
        match name {
            PropName::Ident(id) => self.push(&id.sym),
            PropName::Str(s) => self.push(&fmt_str(&s.value)),
            PropName::Num(n) => self.push(&fmt_num(n.value)),
            PropName::Computed(c) => {
                self.push("[");
                self.emit_expr(&c.expr, PREC_ASSIGN)?;
                self.push("]");
            }
        }
        Ok(())
    }

    // --- Expressions ---

    fn emit_expr(&mut self, expr: &Expr, min_prec: u8) -> Result<()> {
        let own = prec(expr);
        if own < min_prec {
            self.push("(");
            self.emit_expr_inner(expr)?;
            self.push(")");
        } else {
            self.emit_expr_inner(expr)?;
        }
        Ok(())
    }

    fn emit_expr_inner(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Ident(id) => self.push(&id.sym),
            Expr::Num(n) => self.push(&fmt_num(n.value)),
            Expr::Str(s) => self.push(&fmt_str(&s.value)),
            Expr::Bool(b) => self.push(if b.value { "true" } else { "false" }),
            Expr::Null(_) => self.push("null"),
            Expr::This(_) => self.push("this"),
            Expr::Super(_) => self.push("super"),
            Expr::Array(n) => {
                self.push("[");
                for (i, elem) in n.elems.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    if elem.spread {
                        self.push("...");
                    }
                    self.emit_expr(&elem.expr, PREC_ASSIGN)?;
                }
                self.push("]");
            }
            Expr::Object(n) => {
                if n.props.is_empty() {
                    self.push("{}");
                    return Ok(());
                }
                self.push("{ ");
                for (i, prop) in n.props.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match prop {
                        Prop::KeyValue(kv) => {
                            self.emit_prop_name(&kv.key)?;
                            self.push(": ");
                            self.emit_expr(&kv.value, PREC_ASSIGN)?;
                        }
                        Prop::Shorthand(s) => self.push(&s.key.sym),
                        Prop::Method(m) => {
                            match m.kind {
                                MethodKind::Getter => self.push("get "),
                                MethodKind::Setter => self.push("set "),
                                MethodKind::Method => {}
                            }
                            if m.function.is_async {
                                self.push("async ");
                            }
                            if m.function.is_generator {
                                self.push("*");
                            }
                            self.emit_prop_name(&m.key)?;
                            self.push("(");
                            self.emit_params(&m.function.params)?;
                            self.push(") ");
                            self.emit_block(&m.function.body)?;
                        }
                        Prop::Spread(s) => {
                            self.push("...");
                            self.emit_expr(&s.expr, PREC_ASSIGN)?;
                        }
                    }
                }
                self.push(" }");
            }
            Expr::Fn(n) => {
                // `function (x)` anonymous, `function f(x)` named.
                self.emit_fn_keyword(&n.function);
                if let Some(ident) = &n.ident {
                    self.push(&ident.sym);
                }
                self.push("(");
                self.emit_params(&n.function.params)?;
                self.push(") ");
                self.emit_block(&n.function.body)?;
            }
            Expr::Arrow(n) => {
                if n.is_async {
                    self.push("async ");
                }
                self.push("(");
                self.emit_params(&n.params)?;
                self.push(") => ");
                match &n.body {
                    BlockStmtOrExpr::Block(block) => self.emit_block(block)?,
                    BlockStmtOrExpr::Expr(body) => {
                        if starts_ambiguously(body) {
                            self.push("(");
                            self.emit_expr(body, PREC_SEQ)?;
                            self.push(")");
                        } else {
                            self.emit_expr(body, PREC_ASSIGN)?;
                        }
                    }
                }
            }
            Expr::Class(n) => {
                self.push("class");
                if let Some(ident) = &n.ident {
                    self.push(" ");
                    self.push(&ident.sym);
                }
                self.emit_class_rest(&n.class)?;
            }
            Expr::Call(n) => {
                self.emit_expr(&n.callee, PREC_CALL)?;
                self.emit_args(&n.args)?;
            }
            Expr::New(n) => {
                self.push("new ");
                self.emit_expr(&n.callee, PREC_CALL)?;
                self.emit_args(&n.args)?;
            }
            Expr::Member(n) => {
                self.emit_expr(&n.obj, PREC_CALL)?;
                match &n.prop {
                    MemberProp::Ident(id) => {
                        self.push(".");
                        self.push(&id.sym);
                    }
                    MemberProp::Computed(prop) => {
                        self.push("[");
                        self.emit_expr(prop, PREC_SEQ)?;
                        self.push("]");
                    }
                }
            }
            Expr::Cond(n) => {
                self.emit_expr(&n.test, PREC_OR)?;
                self.push(" ? ");
                self.emit_expr(&n.cons, PREC_ASSIGN)?;
                self.push(" : ");
                self.emit_expr(&n.alt, PREC_ASSIGN)?;
            }
            Expr::Assign(n) => {
                match &n.left {
                    AssignTarget::Ident(id) => self.push(&id.sym),
                    AssignTarget::Member(m) => {
                        self.emit_expr_inner(&Expr::Member(m.clone()))?;
                    }
                    AssignTarget::Pat(p) => self.emit_pat(p)?,
                }
                self.push(" ");
                self.push(n.op.as_str());
                self.push(" ");
                self.emit_expr(&n.right, PREC_ASSIGN)?;
            }
            Expr::Bin(n) => {
                let own = bin_prec(n.op);
                self.emit_expr(&n.left, own)?;
                self.push(" ");
                self.push(n.op.as_str());
                self.push(" ");
                self.emit_expr(&n.right, own + 1)?;
            }
            Expr::Unary(n) => {
                self.push(n.op.as_str());
                if matches!(n.op, UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete) {
                    self.push(" ");
                }
                self.emit_expr(&n.arg, PREC_UNARY)?;
            }
            Expr::Update(n) => {
                if n.prefix {
                    self.push(match n.op {
                        UpdateOp::Incr => "++",
                        UpdateOp::Decr => "--",
                    });
                    self.emit_expr(&n.arg, PREC_UNARY)?;
                } else {
                    self.emit_expr(&n.arg, PREC_CALL)?;
                    self.push(match n.op {
                        UpdateOp::Incr => "++",
                        UpdateOp::Decr => "--",
                    });
                }
            }
            Expr::Await(n) => {
                self.push("await ");
                self.emit_expr(&n.arg, PREC_UNARY)?;
            }
            Expr::Yield(n) => {
                self.push("yield");
                if n.delegate {
                    self.push("*");
                }
                if let Some(arg) = &n.arg {
                    self.push(" ");
                    self.emit_expr(arg, PREC_ASSIGN)?;
                }
            }
            Expr::Seq(n) => {
                for (i, e) in n.exprs.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.emit_expr(e, PREC_ASSIGN)?;
                }
            }
            other => {
                return Err(CodegenError::Unsupported {
                    kind: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn emit_args(&mut self, args: &[ExprOrSpread]) -> Result<()> {
        self.push("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if arg.spread {
                self.push("...");
            }
            self.emit_expr(&arg.expr, PREC_ASSIGN)?;
        }
        self.push(")");
        Ok(())
    }

    // --- Patterns ---

    fn emit_pat(&mut self, pat: &Pat) -> Result<()> {
        match pat {
            Pat::Ident(id) => self.push(&id.sym),
            Pat::Array(n) => {
                self.push("[");
                for (i, elem) in n.elems.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    if let Some(elem) = elem {
                        self.emit_pat(elem)?;
                    }
                }
                self.push("]");
            }
            Pat::Object(n) => {
                if n.props.is_empty() {
                    self.push("{}");
                    return Ok(());
                }
                self.push("{ ");
                for (i, prop) in n.props.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.push(&kv.key.sym);
                            self.push(": ");
                            self.emit_pat(&kv.value)?;
                        }
                        ObjectPatProp::Shorthand(s) => {
                            self.push(&s.key.sym);
                            if let Some(default) = &s.default {
                                self.push(" = ");
                                self.emit_expr(default, PREC_ASSIGN)?;
                            }
                        }
                        ObjectPatProp::Rest(r) => {
                            self.push("...");
                            self.emit_pat(&r.arg)?;
                        }
                    }
                }
                self.push(" }");
            }
            Pat::Assign(n) => {
                self.emit_pat(&n.left)?;
                self.push(" = ");
                self.emit_expr(&n.right, PREC_ASSIGN)?;
            }
            Pat::Rest(n) => {
                self.push("...");
                self.emit_pat(&n.arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::new(
            0,
            1,
            LineCol { line: 1, column: 0 },
            LineCol { line: 1, column: 1 },
        )
    }

    fn id(sym: &str) -> Ident {
        Ident {
            span: sp(),
            sym: sym.to_string(),
        }
    }

    fn ident(sym: &str) -> Expr {
        Expr::Ident(id(sym))
    }

    fn num(value: f64) -> Expr {
        Expr::Num(NumLit { span: sp(), value })
    }

    fn emit_expr_str(expr: Expr) -> String {
        let program = Program {
            span: sp(),
            body: vec![Stmt::Expr(ExprStmt {
                span: sp(),
                expr: Box::new(expr),
            })],
        };
        emit_program(&program).unwrap()
    }

    #[test]
    fn numbers_print_as_integers_when_whole() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(3.5), "3.5");
        assert_eq!(fmt_num(0.0), "0");
    }

    #[test]
    fn precedence_parenthesizes_or_under_and() {
        // a && (b || c)
        let expr = Expr::Bin(BinExpr {
            span: sp(),
            op: BinaryOp::LogicalAnd,
            left: Box::new(ident("a")),
            right: Box::new(Expr::Bin(BinExpr {
                span: sp(),
                op: BinaryOp::LogicalOr,
                left: Box::new(ident("b")),
                right: Box::new(ident("c")),
            })),
        });
        assert_eq!(emit_expr_str(expr), "a && (b || c);\n");
    }

    #[test]
    fn guard_ternary_prints_flat() {
        // a == null ? null : a.b()
        let expr = Expr::Cond(CondExpr {
            span: sp(),
            test: Box::new(Expr::Bin(BinExpr {
                span: sp(),
                op: BinaryOp::EqEq,
                left: Box::new(ident("a")),
                right: Box::new(Expr::Null(NullLit { span: sp() })),
            })),
            cons: Box::new(Expr::Null(NullLit { span: sp() })),
            alt: Box::new(Expr::Call(CallExpr {
                span: sp(),
                callee: Box::new(Expr::Member(MemberExpr {
                    span: sp(),
                    obj: Box::new(ident("a")),
                    prop: MemberProp::Ident(id("b")),
                })),
                args: vec![],
            })),
        });
        assert_eq!(emit_expr_str(expr), "a == null ? null : a.b();\n");
    }

    #[test]
    fn iife_gets_parenthesized_by_precedence() {
        let arrow = Expr::Arrow(ArrowExpr {
            span: sp(),
            params: vec![],
            body: BlockStmtOrExpr::Block(BlockStmt {
                span: sp(),
                stmts: vec![Stmt::Return(ReturnStmt {
                    span: sp(),
                    arg: Some(Box::new(num(1.0))),
                })],
            }),
            is_async: false,
        });
        let iife = Expr::Call(CallExpr {
            span: sp(),
            callee: Box::new(arrow),
            args: vec![],
        });
        assert_eq!(emit_expr_str(iife), "(() => {\n  return 1;\n})();\n");
    }

    #[test]
    fn for_loop_head_has_no_stray_semicolons() {
        let program = Program {
            span: sp(),
            body: vec![Stmt::For(ForStmt {
                span: sp(),
                init: Some(VarDeclOrExpr::VarDecl(VarDecl {
                    span: sp(),
                    kind: VarDeclKind::Let,
                    decls: vec![VarDeclarator {
                        span: sp(),
                        name: Pat::Ident(id("i")),
                        init: Some(Box::new(num(0.0))),
                    }],
                    implicit: false,
                })),
                test: Some(Box::new(Expr::Bin(BinExpr {
                    span: sp(),
                    op: BinaryOp::Lt,
                    left: Box::new(ident("i")),
                    right: Box::new(ident("_len")),
                }))),
                update: Some(Box::new(Expr::Update(UpdateExpr {
                    span: sp(),
                    op: UpdateOp::Incr,
                    prefix: false,
                    arg: Box::new(ident("i")),
                }))),
                body: Box::new(Stmt::Block(BlockStmt {
                    span: sp(),
                    stmts: vec![],
                })),
            })],
        };
        assert_eq!(
            emit_program(&program).unwrap(),
            "for (let i = 0; i < _len; i++) {}\n"
        );
    }

    #[test]
    fn object_literal_statement_is_parenthesized() {
        let obj = Expr::Object(ObjectLit {
            span: sp(),
            props: vec![Prop::Shorthand(ShorthandProp {
                span: sp(),
                key: id("a"),
            })],
        });
        assert_eq!(emit_expr_str(obj), "({ a });\n");
    }

    #[test]
    fn anonymous_function_expression_spacing() {
        let f = Expr::Fn(FnExpr {
            span: sp(),
            ident: None,
            function: Function {
                span: sp(),
                params: vec![Pat::Ident(id("x"))],
                body: BlockStmt {
                    span: sp(),
                    stmts: vec![],
                },
                is_async: false,
                is_generator: false,
                return_type: None,
            },
        });
        assert_eq!(emit_expr_str(f), "(function (x) {});\n");
    }

    #[test]
    fn else_if_chains_stay_flat() {
        let chain = Stmt::If(IfStmt {
            span: sp(),
            test: Box::new(ident("a")),
            cons: Box::new(Stmt::Block(BlockStmt {
                span: sp(),
                stmts: vec![Stmt::Expr(ExprStmt {
                    span: sp(),
                    expr: Box::new(num(1.0)),
                })],
            })),
            alt: Some(Box::new(Stmt::If(IfStmt {
                span: sp(),
                test: Box::new(ident("b")),
                cons: Box::new(Stmt::Block(BlockStmt {
                    span: sp(),
                    stmts: vec![Stmt::Expr(ExprStmt {
                        span: sp(),
                        expr: Box::new(num(2.0)),
                    })],
                })),
                alt: None,
            }))),
        });
        let program = Program {
            span: sp(),
            body: vec![chain],
        };
        assert_eq!(
            emit_program(&program).unwrap(),
            "if (a) {\n  1;\n} else if (b) {\n  2;\n}\n"
        );
    }

    #[test]
    fn destructuring_require_line() {
        let decl = Stmt::VarDecl(VarDecl {
            span: sp(),
            kind: VarDeclKind::Const,
            decls: vec![VarDeclarator {
                span: sp(),
                name: Pat::Object(ObjectPat {
                    span: sp(),
                    props: vec![ObjectPatProp::Shorthand(ShorthandPatProp {
                        span: sp(),
                        key: id("looseEq"),
                        default: None,
                    })],
                }),
                init: Some(Box::new(Expr::Call(CallExpr {
                    span: sp(),
                    callee: Box::new(ident("require")),
                    args: vec![ExprOrSpread {
                        spread: false,
                        expr: Box::new(Expr::Str(StrLit {
                            span: sp(),
                            value: "lightscript-stdlib".to_string(),
                        })),
                    }],
                }))),
            }],
            implicit: false,
        });
        let program = Program {
            span: sp(),
            body: vec![decl],
        };
        assert_eq!(
            emit_program(&program).unwrap(),
            "const { looseEq } = require(\"lightscript-stdlib\");\n"
        );
    }

    #[test]
    fn extension_kind_is_an_error() {
        let expr = Expr::LsSafeAwait(LsSafeAwait {
            span: sp(),
            arg: Box::new(num(1.0)),
        });
        let program = Program {
            span: sp(),
            body: vec![Stmt::Expr(ExprStmt {
                span: sp(),
                expr: Box::new(expr),
            })],
        };
        let err = emit_program(&program).unwrap_err();
        assert_eq!(
            err,
            CodegenError::Unsupported {
                kind: NodeKind::LsSafeAwait
            }
        );
    }
}
