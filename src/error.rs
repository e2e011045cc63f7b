//! Rewrite errors and diagnostics.

use crate::ast::NodeId;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

/// Assignment to an observable whose binding is not the declarator that
/// created it (cross-scope mutation). Fatal.
pub const ERR_OBSERVABLE_SCOPE: &str = "P-ERR-OBSERVABLE-SCOPE";
/// No enclosing block statement found while hoisting a computed markup
/// expression. Fatal.
pub const ERR_HOIST_BLOCK: &str = "P-ERR-HOIST-BLOCK";
/// Unrecognized node shape while rendering a member-access chain to text.
/// Recovered: the chain degrades to an empty string.
pub const ERR_MEMBER_SHAPE: &str = "P-ERR-MEMBER-SHAPE";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_OBSERVABLE_SCOPE => {
            "Observables are only set from the scope that initialized them."
        }
        ERR_HOIST_BLOCK => {
            "Hoisted computed bindings are declared inside the component's block, before their first use."
        }
        ERR_MEMBER_SHAPE => {
            "Member-access chains render to a stable textual identity for dependency keying."
        }
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REWRITE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteError {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    pub node: Option<NodeId>,
}

impl RewriteError {
    pub fn new(code: &str, message: &str, node: Option<NodeId>) -> Self {
        RewriteError {
            code: code.to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            node,
        }
    }
}

impl std::fmt::Display for RewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RewriteError {}
