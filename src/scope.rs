//! Lexical scope and binding resolution.
//!
//! The rewriter only ever queries bindings through the narrow
//! [`BindingResolver`] interface, so any host front end with its own scope
//! analysis can drive the core. [`ScopeIndex`] is the reference
//! implementation: a single pre-pass over the tree that records every
//! declaration and every referencing occurrence. Scopes are owned by
//! `Program`, `FunctionDeclaration` and `ArrowFunction` nodes.

use crate::ast::{NodeId, NodeKind, Tree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingKind {
    Param,
    Local,
    Module { source: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Defining declaration node: the declarator for locals, the parameter
    /// node (identifier or whole pattern) for params, the specifier for
    /// imports, the function node for function declarations.
    pub declaration: NodeId,
    /// Every occurrence that reads this binding, in visit order.
    pub references: Vec<NodeId>,
}

impl Binding {
    pub fn is_reference(&self, id: NodeId) -> bool {
        self.references.contains(&id)
    }
}

/// The scope oracle the rewriter consumes.
pub trait BindingResolver {
    /// Resolve `name` lexically from the position of `from`.
    fn resolve(&self, tree: &Tree, from: NodeId, name: &str) -> Option<&Binding>;
}

#[derive(Debug, Default)]
pub struct ScopeIndex {
    scopes: HashMap<NodeId, HashMap<String, Binding>>,
}

impl ScopeIndex {
    pub fn build(tree: &Tree, root: NodeId) -> Self {
        let mut index = ScopeIndex::default();
        index.scopes.insert(root, HashMap::new());
        let mut stack = vec![root];
        index.collect_declarations(tree, root, &mut stack);
        let mut stack = vec![root];
        index.collect_references(tree, root, &mut stack);
        index
    }

    fn declare(&mut self, scope: NodeId, name: &str, kind: BindingKind, declaration: NodeId) {
        self.scopes.entry(scope).or_default().insert(
            name.to_string(),
            Binding {
                name: name.to_string(),
                kind,
                declaration,
                references: Vec::new(),
            },
        );
    }

    fn declare_param(&mut self, tree: &Tree, scope: NodeId, param: NodeId) {
        match tree.kind(param) {
            NodeKind::Identifier { name } => {
                let name = name.clone();
                self.declare(scope, &name, BindingKind::Param, param);
            }
            NodeKind::ObjectPattern { properties } => {
                for prop in properties.clone() {
                    match tree.kind(prop) {
                        NodeKind::Identifier { name } => {
                            let name = name.clone();
                            self.declare(scope, &name, BindingKind::Param, param);
                        }
                        NodeKind::ObjectProperty { value, .. } => {
                            if let NodeKind::Identifier { name } = tree.kind(*value) {
                                let name = name.clone();
                                self.declare(scope, &name, BindingKind::Param, param);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn declare_declarator_pattern(
        &mut self,
        tree: &Tree,
        scope: NodeId,
        declarator: NodeId,
        pattern: NodeId,
    ) {
        match tree.kind(pattern) {
            NodeKind::Identifier { name } => {
                let name = name.clone();
                self.declare(scope, &name, BindingKind::Local, declarator);
            }
            NodeKind::ObjectPattern { properties } => {
                for prop in properties.clone() {
                    match tree.kind(prop) {
                        NodeKind::Identifier { name } => {
                            let name = name.clone();
                            self.declare(scope, &name, BindingKind::Local, declarator);
                        }
                        NodeKind::ObjectProperty { value, .. } => {
                            if let NodeKind::Identifier { name } = tree.kind(*value) {
                                let name = name.clone();
                                self.declare(scope, &name, BindingKind::Local, declarator);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn collect_declarations(&mut self, tree: &Tree, id: NodeId, stack: &mut Vec<NodeId>) {
        match tree.kind(id) {
            NodeKind::FunctionDeclaration {
                id: fn_id,
                params,
                body,
            } => {
                let (fn_id, params, body) = (*fn_id, params.clone(), *body);
                if let NodeKind::Identifier { name } = tree.kind(fn_id) {
                    let name = name.clone();
                    let scope = *stack.last().unwrap();
                    self.declare(scope, &name, BindingKind::Local, id);
                }
                stack.push(id);
                self.scopes.entry(id).or_default();
                for param in params {
                    self.declare_param(tree, id, param);
                }
                self.collect_declarations(tree, body, stack);
                stack.pop();
            }
            NodeKind::ArrowFunction { params, body } => {
                let (params, body) = (params.clone(), *body);
                stack.push(id);
                self.scopes.entry(id).or_default();
                for param in params {
                    self.declare_param(tree, id, param);
                }
                self.collect_declarations(tree, body, stack);
                stack.pop();
            }
            NodeKind::VariableDeclarator { id: pattern, init } => {
                let (pattern, init) = (*pattern, *init);
                let scope = *stack.last().unwrap();
                self.declare_declarator_pattern(tree, scope, id, pattern);
                if let Some(init) = init {
                    self.collect_declarations(tree, init, stack);
                }
            }
            NodeKind::ImportDeclaration { source, specifiers } => {
                let scope = *stack.last().unwrap();
                let source = source.clone();
                for spec in specifiers.clone() {
                    let local = match tree.kind(spec) {
                        NodeKind::ImportSpecifier { local, .. } => Some(*local),
                        NodeKind::ImportNamespaceSpecifier { local } => Some(*local),
                        _ => None,
                    };
                    if let Some(local) = local {
                        if let NodeKind::Identifier { name } = tree.kind(local) {
                            let name = name.clone();
                            self.declare(
                                scope,
                                &name,
                                BindingKind::Module {
                                    source: source.clone(),
                                },
                                spec,
                            );
                        }
                    }
                }
            }
            _ => {
                for child in tree.children(id) {
                    self.collect_declarations(tree, child, stack);
                }
            }
        }
    }

    fn collect_references(&mut self, tree: &Tree, id: NodeId, stack: &mut Vec<NodeId>) {
        let scoped = matches!(
            tree.kind(id),
            NodeKind::FunctionDeclaration { .. } | NodeKind::ArrowFunction { .. }
        );
        if scoped {
            stack.push(id);
        }
        if let NodeKind::Identifier { name } = tree.kind(id) {
            if is_reference_position(tree, id) {
                let name = name.clone();
                for scope in stack.iter().rev() {
                    if let Some(binding) = self
                        .scopes
                        .get_mut(scope)
                        .and_then(|bindings| bindings.get_mut(&name))
                    {
                        binding.references.push(id);
                        break;
                    }
                }
            }
        }
        for child in tree.children(id) {
            self.collect_references(tree, child, stack);
        }
        if scoped {
            stack.pop();
        }
    }
}

impl BindingResolver for ScopeIndex {
    fn resolve(&self, tree: &Tree, from: NodeId, name: &str) -> Option<&Binding> {
        for ancestor in tree.ancestors(from) {
            if let Some(binding) = self
                .scopes
                .get(&ancestor)
                .and_then(|bindings| bindings.get(name))
            {
                return Some(binding);
            }
        }
        None
    }
}

/// True when the identifier occurrence reads a binding, as opposed to
/// defining one or naming a member property or object key.
fn is_reference_position(tree: &Tree, id: NodeId) -> bool {
    let parent = match tree.parent(id) {
        Some(parent) => parent,
        None => return false,
    };
    match tree.kind(parent) {
        NodeKind::VariableDeclarator { id: decl_id, .. } => *decl_id != id,
        NodeKind::FunctionDeclaration { id: fn_id, params, .. } => {
            *fn_id != id && !params.contains(&id)
        }
        NodeKind::ArrowFunction { params, .. } => !params.contains(&id),
        NodeKind::ImportSpecifier { local, .. } => *local != id,
        NodeKind::ImportNamespaceSpecifier { local } => *local != id,
        NodeKind::ObjectPattern { .. } => false,
        NodeKind::MemberExpression {
            property, computed, ..
        } => *property != id || *computed,
        NodeKind::ObjectProperty { key, value } => {
            if *key == id {
                return false;
            }
            // A pattern's `{ a: b }` value is a defining occurrence.
            if *value == id {
                if let Some(grandparent) = tree.parent(parent) {
                    if matches!(tree.kind(grandparent), NodeKind::ObjectPattern { .. }) {
                        return false;
                    }
                }
            }
            true
        }
        _ => true,
    }
}
