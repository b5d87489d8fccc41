//! AST-to-AST transform that desugars LightScript syntax into standard
//! JavaScript.
//!
//! The upstream parser hands over a [`lsc_ast::Program`] whose subtree
//! mixes standard and extension kinds; [`desugar_program`] returns a
//! tree containing only standard kinds, every node carrying a source
//! position, or the first fatal construct diagnostic.
//!
//! Transforms:
//! - counted range loops and array/object iteration → indexed `for`
//! - array/object comprehensions → accumulating IIFEs
//! - `a ~ f(b)` → `f(a, b)`
//! - terse function forms → functions, arrows, bound functions
//! - fat-arrow methods → constructor-time / post-construction binds
//! - `if` expressions → ternaries
//! - `a?.b` chains → evaluate-once guard ternaries
//! - safe await → two-outcome try/catch IIFE
//! - `match` → guarded `if` chains with destructuring
//! - implicit returns, `await` fan-out, stdlib import injection

pub mod check;
pub mod comprehension;
pub mod desugar;
pub mod diag;
pub mod factory;
pub mod functions;
pub mod if_expr;
pub mod implicit_return;
pub mod loops;
pub mod match_expr;
pub mod safe;
pub mod scope;
pub mod stdlib;
pub mod tail;
pub mod tilde;

pub use desugar::{desugar_program, Options};
pub use diag::{Diagnostic, ErrorKind};
pub use stdlib::{ImportStyle, StdlibOptions};
