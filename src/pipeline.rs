//! Pass entry point.
//!
//! `rewrite_module` owns one unit end to end: build the scope index, run the
//! rewriter, drain the context into a report. `rewrite_modules` fans units
//! out over rayon; each worker owns its tree, scope index and hoist counter
//! exclusively, so hoisted names are unique within a unit without any shared
//! state.

use crate::ast::Tree;
use crate::error::RewriteError;
use crate::rewrite::Rewriter;
use crate::scope::ScopeIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const PASS_NAME: &str = "pulse-markup-rewrite";

/// Registration record handed to the host toolkit.
pub struct RewritePass;

impl RewritePass {
    pub fn name(&self) -> &'static str {
        PASS_NAME
    }

    /// Parser capabilities the pass needs the host front end to enable.
    pub fn required_syntax(&self) -> &'static [&'static str] {
        &["markup"]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteReport {
    pub hoisted: u64,
    pub diagnostics: Vec<RewriteError>,
}

pub fn rewrite_module(tree: &mut Tree) -> Result<RewriteReport, RewriteError> {
    let root = match tree.root() {
        Some(root) => root,
        None => {
            return Ok(RewriteReport {
                hoisted: 0,
                diagnostics: Vec::new(),
            })
        }
    };
    let scopes = ScopeIndex::build(tree, root);
    let mut rewriter = Rewriter::new(&scopes);
    rewriter.run(tree)?;
    Ok(RewriteReport {
        hoisted: rewriter.ctx.hoist_count,
        diagnostics: std::mem::take(&mut rewriter.ctx.diagnostics),
    })
}

pub fn rewrite_modules(trees: &mut [Tree]) -> Vec<Result<RewriteReport, RewriteError>> {
    trees.par_iter_mut().map(rewrite_module).collect()
}
