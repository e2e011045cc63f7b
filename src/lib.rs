//! # Pulse Rewriter Core
//!
//! Dependency-inference and tree-rewriting engine for the Pulse reactive
//! markup dialect. Markup elements lower to `Pulse.registerElement` /
//! `Pulse.registerComponent` calls; reactive expressions are wrapped in
//! `Pulse.compute` with an inferred dependency array, so authors never write
//! one by hand.
//!
//! ## Rewrite Invariants
//!
//! 1. **Runtime surface**: every generated call names a real `pulse-js`
//!    export (`observable`, `observableArray`, `compute`, `effect`,
//!    `conditional`, `observe`, `registerElement`, `registerComponent`,
//!    `getPropValue`). The table lives in [`runtime`].
//!
//! 2. **Read forms**: observable reads are `<name>.value` member accesses,
//!    observable writes are `<name>.set(..)` calls, prop reads go through
//!    `Pulse.getPropValue(..)`. An identifier is never classified as both a
//!    prop read and an observable read.
//!
//! 3. **Boundary-stopping**: dependency collection never crosses into a
//!    nested `compute`/`effect` call or a markup expression container; those
//!    subtrees infer their own dependency sets.
//!
//! 4. **Declaration before use**: hoisted `computed__ref_<n>` constants are
//!    inserted before the return statement, or before any outer variable
//!    declaration whose initializer references them. The counter is per run
//!    over one unit, so parallel units never collide.
//!
//! 5. **Fail-closed classification**: predicates answer negative when context
//!    is missing (no enclosing component, no binding); the node is left
//!    untransformed. The only fatal errors are cross-scope observable
//!    assignment (`P-ERR-OBSERVABLE-SCOPE`) and a missing hoist target block
//!    (`P-ERR-HOIST-BLOCK`).

pub mod ast;
pub mod collect;
pub mod error;
pub mod pipeline;
pub mod predicates;
pub mod rewrite;
pub mod runtime;
pub mod scope;

#[cfg(test)]
mod collect_tests;
#[cfg(test)]
mod hoist_tests;

pub use ast::{AttributeName, DeclarationKind, NodeId, NodeKind, Tree};
pub use error::RewriteError;
pub use pipeline::{rewrite_module, rewrite_modules, RewritePass, RewriteReport, PASS_NAME};
pub use rewrite::{RewriteContext, Rewriter};
pub use scope::{Binding, BindingKind, BindingResolver, ScopeIndex};
