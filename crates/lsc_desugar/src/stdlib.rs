//! Standard-library import injection.
//!
//! During the main traversal the orchestrator records every reference to
//! a recognized helper name that has no local binding; at the end of the
//! program the table is consumed once to synthesize `require`- or
//! `import`-form declarations, prepended to the program body.

use indexmap::{IndexMap, IndexSet};
use lsc_ast::*;
use serde::{Deserialize, Serialize};

use crate::factory as f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStyle {
    Require,
    Import,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdlibOptions {
    pub enabled: bool,
    pub style: ImportStyle,
    /// Helper names that participate in auto-import.
    pub helpers: Vec<String>,
    pub module: String,
}

impl Default for StdlibOptions {
    fn default() -> StdlibOptions {
        StdlibOptions {
            enabled: true,
            style: ImportStyle::Require,
            helpers: vec![
                "looseEq".to_string(),
                "looseNotEq".to_string(),
                "bitwiseNot".to_string(),
            ],
            module: "lightscript-stdlib".to_string(),
        }
    }
}

/// Module path → ordered-insert set of specifier names. Lives for one
/// program traversal.
#[derive(Debug, Default)]
pub struct ImportTable {
    modules: IndexMap<String, IndexSet<String>>,
}

impl ImportTable {
    pub fn new() -> ImportTable {
        ImportTable::default()
    }

    pub fn record(&mut self, module: &str, name: &str) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Consume the table into declarations placed at `span` (callers
    /// pass a zero-width span at the program start).
    pub fn into_decls(self, style: ImportStyle, span: Span) -> Vec<Stmt> {
        self.modules
            .into_iter()
            .map(|(module, names)| match style {
                ImportStyle::Import => Stmt::Import(ImportDecl {
                    span,
                    specifiers: names
                        .into_iter()
                        .map(|name| ImportSpecifier {
                            span,
                            local: f::ident(name, span),
                        })
                        .collect(),
                    src: f::str_lit(module, span),
                }),
                ImportStyle::Require => {
                    // const { a, b } = require("module");
                    let pat = Pat::Object(ObjectPat {
                        span,
                        props: names
                            .into_iter()
                            .map(|name| {
                                ObjectPatProp::Shorthand(ShorthandPatProp {
                                    span,
                                    key: f::ident(name, span),
                                    default: None,
                                })
                            })
                            .collect(),
                    });
                    let init = f::call(
                        f::ident_expr(f::ident("require", span)),
                        vec![f::str_expr(module, span)],
                        span,
                    );
                    Stmt::VarDecl(f::var_decl(VarDeclKind::Const, pat, Some(init), span))
                }
            })
            .collect()
    }
}
