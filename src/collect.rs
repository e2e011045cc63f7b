//! Dependency collection for synthesized dependency arrays.
//!
//! The collector walks a callback body and gathers every reactive read, keyed
//! by the textual identity of its member chain so that repeated reads of the
//! same source collapse to one entry. Collection stops at nested reactive
//! calls (their own dependency arrays cover them) and at markup expression
//! containers (lowered on their own pass).

use crate::ast::{NodeId, NodeKind, Tree};
use crate::error::{RewriteError, ERR_MEMBER_SHAPE};
use crate::predicates;
use crate::runtime;
use crate::scope::BindingResolver;
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════════
// TEXTUAL IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Render a member-access chain to its source-text form (`todo.text`,
/// `rows[0].label`). Shapes outside the supported chain grammar degrade to an
/// empty string and record a recovered diagnostic; callers drop empty keys.
pub fn member_chain_text(
    tree: &Tree,
    id: NodeId,
    diagnostics: &mut Vec<RewriteError>,
) -> String {
    match tree.kind(id) {
        NodeKind::Identifier { name } => name.clone(),
        NodeKind::MemberExpression {
            object,
            property,
            computed,
        } => {
            let object_text = member_chain_text(tree, *object, diagnostics);
            if object_text.is_empty() {
                return String::new();
            }
            if *computed {
                match tree.kind(*property) {
                    NodeKind::StringLiteral { value } => {
                        format!("{}[\"{}\"]", object_text, value)
                    }
                    NodeKind::NumberLiteral { value } => format!("{}[{}]", object_text, value),
                    _ => {
                        diagnostics.push(RewriteError::new(
                            ERR_MEMBER_SHAPE,
                            "computed member property is not a literal",
                            Some(id),
                        ));
                        String::new()
                    }
                }
            } else {
                match tree.kind(*property) {
                    NodeKind::Identifier { name } => format!("{}.{}", object_text, name),
                    _ => {
                        diagnostics.push(RewriteError::new(
                            ERR_MEMBER_SHAPE,
                            "member property is not an identifier",
                            Some(id),
                        ));
                        String::new()
                    }
                }
            }
        }
        _ => {
            diagnostics.push(RewriteError::new(
                ERR_MEMBER_SHAPE,
                "node does not start a member chain",
                Some(id),
            ));
            String::new()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPENDENCY SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Name-keyed dependency accumulator. Later occurrences of the same textual
/// identity replace earlier ones; emission order is sorted by key so output
/// is stable across runs.
#[derive(Debug, Default)]
pub struct DepSet {
    entries: HashMap<String, NodeId>,
}

impl DepSet {
    pub fn insert(&mut self, key: String, node: NodeId) {
        if key.is_empty() {
            return;
        }
        self.entries.insert(key, node);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_sorted(self) -> Vec<NodeId> {
        let mut entries: Vec<(String, NodeId)> = self.entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, node)| node).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// The node a reactive identifier contributes to a dependency array: the
/// enclosing member expression when the identifier takes part in a plain
/// field access (`todo.text`, `props.title`), otherwise the identifier
/// itself. Accesses of the runtime's `value`/`set` members are never
/// promoted; the exclusion filters drop those occurrences anyway.
pub fn dependency_target(tree: &Tree, id: NodeId) -> NodeId {
    if let Some(parent) = tree.parent(id) {
        if let NodeKind::MemberExpression {
            property,
            computed: false,
            ..
        } = tree.kind(parent)
        {
            let is_runtime_member = matches!(
                tree.kind(*property),
                NodeKind::Identifier { name }
                    if name == runtime::VALUE_MEMBER || name == runtime::SET_MEMBER
            );
            if !is_runtime_member {
                return parent;
            }
        }
    }
    id
}

fn is_collection_boundary(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    id: NodeId,
    root: NodeId,
) -> bool {
    if id == root {
        return false;
    }
    if matches!(tree.kind(id), NodeKind::MarkupExpressionContainer { .. }) {
        return true;
    }
    predicates::is_module_method(tree, scopes, id, runtime::COMPUTE)
        || predicates::is_module_method(tree, scopes, id, runtime::EFFECT)
}

/// Every identifier occurrence under `root` matching `pred`, in source order.
/// Nested reactive calls and markup containers are not descended into.
pub fn find_nested_identifiers<F>(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    root: NodeId,
    pred: F,
) -> Vec<NodeId>
where
    F: Fn(NodeId) -> bool,
{
    let mut found = Vec::new();
    walk(tree, scopes, root, root, &pred, &mut found);
    found
}

/// The reactive reads under `root`: observable references and prop reads.
pub fn find_nested_observables(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    root: NodeId,
) -> Vec<NodeId> {
    find_nested_identifiers(tree, scopes, root, |id| {
        predicates::is_observable_ref(tree, scopes, id)
            || predicates::is_prop_identifier(tree, scopes, id)
    })
}

fn walk<F>(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    id: NodeId,
    root: NodeId,
    pred: &F,
    found: &mut Vec<NodeId>,
) where
    F: Fn(NodeId) -> bool,
{
    if is_collection_boundary(tree, scopes, id, root) {
        return;
    }
    if matches!(tree.kind(id), NodeKind::Identifier { .. }) && pred(id) {
        found.push(id);
    }
    for child in tree.children(id) {
        walk(tree, scopes, child, root, pred, found);
    }
}
