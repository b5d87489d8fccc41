//! Lexical scope tracking and collision-free identifier generation.
//!
//! The desugarer pushes a scope per program, function and block, records
//! every binding the source (or a rewrite) introduces, and asks here for
//! fresh names when a rule needs a temporary. Generated names are
//! reserved program-wide, so two rules can never hand out the same name
//! even across unrelated scopes.

use std::collections::{HashMap, HashSet};

use lsc_ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
    CatchParam,
    Import,
    /// Introduced by a rewrite rule.
    Synthetic,
}

impl BindingKind {
    pub fn is_reassignable(self) -> bool {
        !matches!(self, BindingKind::Const | BindingKind::Import)
    }
}

impl From<VarDeclKind> for BindingKind {
    fn from(kind: VarDeclKind) -> BindingKind {
        match kind {
            VarDeclKind::Var => BindingKind::Var,
            VarDeclKind::Let => BindingKind::Let,
            VarDeclKind::Const => BindingKind::Const,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    bindings: HashMap<String, BindingKind>,
}

#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    /// Every generated name, reserved for the whole program.
    generated: HashSet<String>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> ScopeStack {
        ScopeStack {
            scopes: vec![Scope {
                kind: ScopeKind::Program,
                bindings: HashMap::new(),
            }],
            generated: HashSet::new(),
        }
    }

    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind,
            bindings: HashMap::new(),
        });
    }

    pub fn pop(&mut self) {
        assert!(self.scopes.len() > 1, "popped the program scope");
        self.scopes.pop();
    }

    /// Record a binding in the current scope.
    pub fn register(&mut self, name: &str, kind: BindingKind) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .bindings
            .insert(name.to_string(), kind);
    }

    /// Innermost binding visible under `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<BindingKind> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name).copied())
    }

    /// Like [`lookup`](Self::lookup), but skipping the current scope;
    /// used by the implicit-`const` shadowing diagnostic.
    pub fn lookup_enclosing(&self, name: &str) -> Option<BindingKind> {
        self.scopes
            .iter()
            .rev()
            .skip(1)
            .find_map(|scope| scope.bindings.get(name).copied())
    }

    /// Every binding name visible from the current position, sorted.
    pub fn visible_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.bindings.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Reserve an underscore-prefixed source name so [`fresh`](Self::fresh)
    /// never hands it out. The orchestrator pre-scans the whole program,
    /// since a temporary can be generated before traversal reaches the
    /// scope that binds the conflicting name.
    pub fn reserve(&mut self, name: &str) {
        if name.starts_with('_') {
            self.generated.insert(name.to_string());
        }
    }

    fn is_taken(&self, name: &str) -> bool {
        self.generated.contains(name) || self.lookup(name).is_some()
    }

    /// A name guaranteed not to collide with any visible binding or any
    /// previously generated name: `_hint`, `_hint2`, `_hint3`, ...
    pub fn fresh(&mut self, hint: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = if n == 1 {
                format!("_{hint}")
            } else {
                format!("_{hint}{n}")
            };
            if !self.is_taken(&candidate) {
                self.generated.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }

    /// Kind of the current scope; useful in tests and assertions.
    pub fn current_kind(&self) -> ScopeKind {
        self.scopes.last().expect("scope stack is never empty").kind
    }
}

/// Register every binding the statements of a block introduce. Called on
/// scope entry so that forward references (function hoisting) and the
/// reassignment discipline see them.
pub fn collect_bindings(scopes: &mut ScopeStack, stmts: &[Stmt]) {
    for stmt in stmts {
        match stmt {
            Stmt::VarDecl(decl) => {
                let kind = BindingKind::from(decl.kind);
                for declarator in &decl.decls {
                    let mut names = Vec::new();
                    declarator.name.bound_names(&mut names);
                    for id in names {
                        scopes.register(&id.sym, kind);
                    }
                }
            }
            Stmt::FnDecl(decl) => scopes.register(&decl.ident.sym, BindingKind::Function),
            Stmt::ClassDecl(decl) => scopes.register(&decl.ident.sym, BindingKind::Class),
            Stmt::Import(decl) => {
                for spec in &decl.specifiers {
                    scopes.register(&spec.local.sym, BindingKind::Import);
                }
            }
            // A skinny named arrow becomes a function declaration, the
            // fat form becomes a `const`; bind accordingly up front.
            Stmt::LsNamedArrowDecl(decl) => {
                let kind = if decl.function.skinny {
                    BindingKind::Function
                } else {
                    BindingKind::Const
                };
                scopes.register(&decl.ident.sym, kind);
            }
            _ => {}
        }
    }
}
