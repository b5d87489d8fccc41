//! LightScript AST.
//!
//! The standard JavaScript node vocabulary plus the LightScript extension
//! kinds, one closed tagged union per syntactic class. Also home to the
//! type registry (declared shapes, categories, validators) and the
//! mutable visitor the desugaring engine traverses with.
//!
//! Trees cross process boundaries as internally-tagged JSON: the upstream
//! parser hands a `Program` in, the downstream code generator takes a
//! `Program` (extension-free) back out.

pub mod ast;
pub mod ext;
pub mod registry;
pub mod span;
pub mod visit;

pub use ast::*;
pub use ext::*;
pub use registry::{Category, Edge, KindSpec, NodeKind, NodeRef, TypeRegistry};
pub use span::{LineCol, Span};
pub use visit::VisitMut;
