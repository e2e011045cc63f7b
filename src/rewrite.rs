//! The tree rewriter.
//!
//! One top-down walk over the unit drives five rewrites: markup lowering,
//! computed-expression wrapping, observable-read and prop-read rewriting,
//! assignment-to-setter rewriting, and shorthand dependency synthesis.
//! Rewrites are destructive: a visited node is swapped for its call form in
//! place and the walk re-enters the replacement, so a markup container can
//! collapse to a bare identifier on one visit and pick up its `.value` read
//! form on the next.
//!
//! Ordering invariant: a markup element's expression subtree is processed
//! while the element is still in markup form. Computed wrapping qualifies on
//! "parent is an expression container", and that context is gone once the
//! element has been lowered.

use crate::ast::{NodeId, NodeKind, Tree};
use crate::collect::{self, DepSet};
use crate::error::{RewriteError, ERR_HOIST_BLOCK, ERR_OBSERVABLE_SCOPE};
use crate::predicates;
use crate::runtime;
use crate::scope::BindingResolver;

/// Per-run mutable state: the hoist counter and the non-fatal diagnostics
/// drained into the report when the run finishes.
#[derive(Debug, Default)]
pub struct RewriteContext {
    pub hoist_count: u64,
    pub diagnostics: Vec<RewriteError>,
}

/// Which handlers a walk runs.
///
/// `Full` is the top-level set. `ExpressionsOnly` runs over a markup
/// element's subtree before lowering and leaves markup nodes alone.
/// `HoistPrep` re-processes a hoisted expression: the full set, except
/// containers always unwrap so hoisting cannot recurse into itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassSet {
    Full,
    ExpressionsOnly,
    HoistPrep,
}

enum VisitKind {
    Identifier,
    Call,
    Computable,
    Assignment,
    Element,
    Container,
    Text,
    Other,
}

pub struct Rewriter<'a> {
    scopes: &'a dyn BindingResolver,
    pub ctx: RewriteContext,
}

impl<'a> Rewriter<'a> {
    pub fn new(scopes: &'a dyn BindingResolver) -> Self {
        Rewriter {
            scopes,
            ctx: RewriteContext::default(),
        }
    }

    pub fn run(&mut self, tree: &mut Tree) -> Result<(), RewriteError> {
        let root = match tree.root() {
            Some(root) => root,
            None => return Ok(()),
        };
        self.walk(tree, root, PassSet::Full)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // WALK
    // ═══════════════════════════════════════════════════════════════════════════════

    fn walk(&mut self, tree: &mut Tree, id: NodeId, pass: PassSet) -> Result<(), RewriteError> {
        let id = self.dispatch(tree, id, pass)?;
        for child in tree.children(id) {
            self.walk(tree, child, pass)?;
        }
        Ok(())
    }

    /// Visit a node until it settles, following replacements. Returns the id
    /// the walk should descend into.
    fn dispatch(
        &mut self,
        tree: &mut Tree,
        mut id: NodeId,
        pass: PassSet,
    ) -> Result<NodeId, RewriteError> {
        while let Some(next) = self.visit(tree, id, pass)? {
            id = next;
        }
        Ok(id)
    }

    fn visit(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        pass: PassSet,
    ) -> Result<Option<NodeId>, RewriteError> {
        let kind = match tree.kind(id) {
            NodeKind::Identifier { .. } => VisitKind::Identifier,
            NodeKind::CallExpression { .. } => VisitKind::Call,
            NodeKind::ConditionalExpression { .. }
            | NodeKind::BinaryExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::TemplateLiteral { .. } => VisitKind::Computable,
            NodeKind::AssignmentExpression { .. } => VisitKind::Assignment,
            NodeKind::MarkupElement { .. } => VisitKind::Element,
            NodeKind::MarkupExpressionContainer { .. } => VisitKind::Container,
            NodeKind::MarkupText { .. } => VisitKind::Text,
            _ => VisitKind::Other,
        };
        match kind {
            VisitKind::Identifier => Ok(self.rewrite_identifier(tree, id)),
            VisitKind::Call => {
                self.rewrite_call(tree, id);
                Ok(None)
            }
            VisitKind::Computable => Ok(self.wrap_computed(tree, id)),
            VisitKind::Assignment => self.rewrite_assignment(tree, id),
            VisitKind::Element if pass != PassSet::ExpressionsOnly => {
                // Expression handlers must see the markup context before it
                // is lowered away.
                for child in tree.children(id) {
                    self.walk(tree, child, PassSet::ExpressionsOnly)?;
                }
                self.lower_markup(tree, id);
                Ok(Some(id))
            }
            VisitKind::Container if pass == PassSet::Full => self.visit_container(tree, id),
            VisitKind::Container if pass == PassSet::HoistPrep => Ok(self.unwrap_container(tree, id)),
            VisitKind::Text if pass != PassSet::ExpressionsOnly => {
                self.rewrite_text(tree, id);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn namespace_callee(&self, tree: &mut Tree, name: &str) -> NodeId {
        let namespace = tree.ident(runtime::NAMESPACE);
        tree.member(namespace, name)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // IDENTIFIER REWRITING
    // ═══════════════════════════════════════════════════════════════════════════════

    /// Prop reads become `Pulse.getPropValue(..)`, observable reads become
    /// `<name>.value`. Occurrences in any excluded context stay put.
    fn rewrite_identifier(&mut self, tree: &mut Tree, id: NodeId) -> Option<NodeId> {
        let scopes = self.scopes;
        if predicates::is_prop_identifier(tree, scopes, id) {
            if predicates::is_wrapped_in_prop_value_getter(tree, scopes, id)
                || predicates::is_in_dependency_array(tree, scopes, id)
                || predicates::is_in_component_props(tree, scopes, id)
                || predicates::is_in_markup_attribute(tree, id)
                || predicates::is_value_access(tree, id)
                || predicates::is_setter_access(tree, id)
                || predicates::is_observable_array_data(tree, scopes, id)
                || predicates::is_wrapped_in_observe(tree, scopes, id)
            {
                return None;
            }
            // For `props.field` the whole member access is the read; wrapping
            // only the field identifier would leave it in property position.
            let target = match tree.parent(id) {
                Some(parent) => match tree.kind(parent) {
                    NodeKind::MemberExpression {
                        property,
                        computed: false,
                        ..
                    } if *property == id => parent,
                    _ => id,
                },
                None => return None,
            };
            let outer = tree.parent(target)?;
            let callee = self.namespace_callee(tree, runtime::GET_PROP_VALUE);
            let call = tree.call(callee, vec![target]);
            tree.substitute(outer, target, call);
            Some(call)
        } else if predicates::is_observable_ref(tree, scopes, id) {
            if predicates::is_in_dependency_array(tree, scopes, id)
                || predicates::is_in_component_props(tree, scopes, id)
                || predicates::is_in_markup_attribute(tree, id)
                || predicates::is_value_access(tree, id)
                || predicates::is_setter_access(tree, id)
                || predicates::is_observable_array_data(tree, scopes, id)
                || predicates::is_wrapped_in_observe(tree, scopes, id)
            {
                return None;
            }
            let parent = tree.parent(id)?;
            // Bare observables returned from a component pass through whole.
            if matches!(tree.kind(parent), NodeKind::ReturnStatement { .. }) {
                return None;
            }
            let property = tree.ident(runtime::VALUE_MEMBER);
            let member = tree.alloc(NodeKind::MemberExpression {
                object: id,
                property,
                computed: false,
            });
            tree.substitute(parent, id, member);
            Some(member)
        } else {
            None
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // COMPUTED WRAPPING
    // ═══════════════════════════════════════════════════════════════════════════════

    /// Wrap a qualifying expression in `Pulse.compute(() => <expr>, [deps])`
    /// when its inferred dependency set is non-empty.
    fn wrap_computed(&mut self, tree: &mut Tree, id: NodeId) -> Option<NodeId> {
        let scopes = self.scopes;
        if predicates::is_inner_function(tree, id)
            || predicates::is_wrapped_in_computed(tree, scopes, id)
            || predicates::is_wrapped_in_effect(tree, scopes, id)
            || predicates::is_in_conditional_condition(tree, id)
            || predicates::is_wrapped_in_setter(tree, id)
            || predicates::is_in_observable_array(tree, scopes, id)
            || predicates::is_wrapped_in_observe(tree, scopes, id)
        {
            return None;
        }
        let parent = tree.parent(id)?;
        let qualifies = matches!(
            tree.kind(parent),
            NodeKind::VariableDeclarator { .. } | NodeKind::MarkupExpressionContainer { .. }
        );
        if !qualifies {
            return None;
        }

        let deps = self.collect_deps(tree, id, id);
        if deps.is_empty() {
            return None;
        }
        let clones: Vec<NodeId> = deps.iter().map(|&dep| tree.clone_subtree(dep)).collect();
        let deps_array = tree.array(clones);
        let callee = self.namespace_callee(tree, runtime::COMPUTE);
        let thunk = tree.arrow(Vec::new(), id);
        let call = tree.call(callee, vec![thunk, deps_array]);
        tree.substitute(parent, id, call);
        Some(call)
    }

    /// Deduplicated, name-sorted dependency targets under `root`.
    /// `own_call` is the call the deps are for (occurrences inside a
    /// *different* compute call belong to that call's own set).
    fn collect_deps(&mut self, tree: &Tree, root: NodeId, own_call: NodeId) -> Vec<NodeId> {
        let scopes = self.scopes;
        let mut set = DepSet::default();
        let mut diagnostics = Vec::new();
        for occurrence in collect::find_nested_observables(tree, scopes, root) {
            if matches!(
                tree.parent(occurrence).map(|p| tree.kind(p)),
                Some(NodeKind::MarkupExpressionContainer { .. })
            ) {
                continue;
            }
            if predicates::match_ancestors(tree, occurrence, |p| {
                p != own_call && predicates::is_module_method(tree, scopes, p, runtime::COMPUTE)
            }) {
                continue;
            }
            if predicates::is_in_conditional_condition(tree, occurrence)
                || predicates::is_value_access(tree, occurrence)
                || predicates::is_setter_access(tree, occurrence)
                || predicates::is_assignment_target(tree, occurrence)
            {
                continue;
            }
            let target = collect::dependency_target(tree, occurrence);
            let key = collect::member_chain_text(tree, target, &mut diagnostics);
            set.insert(key, target);
        }
        self.ctx.diagnostics.extend(diagnostics);
        set.into_sorted()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CALLS
    // ═══════════════════════════════════════════════════════════════════════════════

    /// `effect`/`compute` calls written without a dependency array get one
    /// synthesized; a bare first argument is coerced to a zero-param thunk.
    fn rewrite_call(&mut self, tree: &mut Tree, id: NodeId) {
        let scopes = self.scopes;
        if !predicates::is_module_method(tree, scopes, id, runtime::EFFECT)
            && !predicates::is_module_method(tree, scopes, id, runtime::COMPUTE)
        {
            return;
        }
        let (callee, arguments) = match tree.kind(id) {
            NodeKind::CallExpression { callee, arguments } => (*callee, arguments.clone()),
            _ => return,
        };
        if arguments.len() >= 2 {
            return;
        }
        let first = match arguments.first() {
            Some(&first) => first,
            None => return,
        };

        // Collect before restructuring so occurrences still sit in their
        // original context.
        let deps = self.collect_deps(tree, id, id);
        let clones: Vec<NodeId> = deps.iter().map(|&dep| tree.clone_subtree(dep)).collect();
        let deps_array = tree.array(clones);
        let body = if matches!(tree.kind(first), NodeKind::ArrowFunction { .. }) {
            first
        } else {
            tree.arrow(Vec::new(), first)
        };
        tree.replace(
            id,
            NodeKind::CallExpression {
                callee,
                arguments: vec![body, deps_array],
            },
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ASSIGNMENTS
    // ═══════════════════════════════════════════════════════════════════════════════

    /// `obs = x` becomes `obs.set(x)`. Writing through a binding that is not
    /// the declarator which created the observable is a fatal error.
    fn rewrite_assignment(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
    ) -> Result<Option<NodeId>, RewriteError> {
        let scopes = self.scopes;
        let (left, right) = match tree.kind(id) {
            NodeKind::AssignmentExpression { left, right } => (*left, *right),
            _ => return Ok(None),
        };
        let name = match tree.kind(left) {
            NodeKind::Identifier { name } => name.clone(),
            _ => return Ok(None),
        };
        let binding = match scopes.resolve(tree, left, &name) {
            Some(binding) => binding,
            None => return Ok(None),
        };
        if !predicates::is_observable_binding(tree, scopes, binding) {
            let is_declarator = matches!(
                tree.kind(binding.declaration),
                NodeKind::VariableDeclarator { .. }
            );
            if !is_declarator {
                if let Some(root) = tree.root() {
                    if predicates::observable_declared_anywhere(tree, scopes, root, &name) {
                        return Err(RewriteError::new(
                            ERR_OBSERVABLE_SCOPE,
                            &format!(
                                "observable `{}` cannot be set outside the scope that initialized it",
                                name
                            ),
                            Some(id),
                        ));
                    }
                }
            }
            return Ok(None);
        }

        let parent = match tree.parent(id) {
            Some(parent) => parent,
            None => return Ok(None),
        };
        let object = tree.ident(&name);
        let callee = tree.member(object, runtime::SET_MEMBER);
        let call = tree.call(callee, vec![right]);
        tree.substitute(parent, id, call);
        Ok(Some(call))
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MARKUP LOWERING
    // ═══════════════════════════════════════════════════════════════════════════════

    /// Attribute value in final form: absent values mean `true`, containers
    /// contribute their inner expression, anything else passes through.
    fn map_property_value(&self, tree: &mut Tree, value: Option<NodeId>) -> NodeId {
        match value {
            None => tree.boolean(true),
            Some(value) => match tree.kind(value) {
                NodeKind::MarkupExpressionContainer { expression } => *expression,
                _ => value,
            },
        }
    }

    fn get_properties(&self, tree: &mut Tree, attributes: &[NodeId]) -> Vec<NodeId> {
        let mut properties = Vec::with_capacity(attributes.len());
        for &attr in attributes {
            let (key, value) = match tree.kind(attr) {
                NodeKind::MarkupAttribute { name, value } => (name.as_key(), *value),
                _ => continue,
            };
            let value = self.map_property_value(tree, value);
            let key = tree.string(&key);
            properties.push(tree.object_prop(key, value));
        }
        properties
    }

    /// Lower one markup element to its `registerElement`/`registerComponent`
    /// call. Nested elements inside the children are lowered when the walk
    /// reaches them in the replacement's argument list.
    fn lower_markup(&mut self, tree: &mut Tree, id: NodeId) {
        let (name, attributes, children) = match tree.kind(id) {
            NodeKind::MarkupElement {
                name,
                attributes,
                children,
            } => (name.clone(), attributes.clone(), children.clone()),
            _ => return,
        };
        let is_component = name
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false);

        if is_component {
            let component_name = runtime::strip_component_prefix(&name);
            let declaration_name = runtime::component_declaration_name(&name);
            let declared_in_unit = self.scopes.resolve(tree, id, &declaration_name).is_some();
            let implementation = if declared_in_unit {
                tree.ident(&declaration_name)
            } else {
                tree.ident(&name)
            };

            let mut properties = self.get_properties(tree, &attributes);
            let mapped: Vec<NodeId> = children
                .iter()
                .map(|&child| self.map_property_value(tree, Some(child)))
                .collect();
            let children_array = tree.array(mapped);
            let children_key = tree.string("children");
            properties.push(tree.object_prop(children_key, children_array));
            let props = tree.object(properties);

            let callee = self.namespace_callee(tree, runtime::REGISTER_COMPONENT);
            let name_literal = tree.string(&component_name);
            tree.replace(
                id,
                NodeKind::CallExpression {
                    callee,
                    arguments: vec![name_literal, implementation, props],
                },
            );
        } else {
            let properties = self.get_properties(tree, &attributes);
            let props = tree.object(properties);
            let children_array = tree.array(children);
            let callee = self.namespace_callee(tree, runtime::REGISTER_ELEMENT);
            let tag = tree.string(&name);
            tree.replace(
                id,
                NodeKind::CallExpression {
                    callee,
                    arguments: vec![tag, props, children_array],
                },
            );
        }
    }

    fn rewrite_text(&mut self, tree: &mut Tree, id: NodeId) {
        let value = match tree.kind(id) {
            NodeKind::MarkupText { value } => value.clone(),
            _ => return,
        };
        if runtime::is_blank_markup_text(&value) {
            tree.detach(id);
        } else {
            tree.replace(id, NodeKind::StringLiteral { value });
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CONTAINERS AND HOISTING
    // ═══════════════════════════════════════════════════════════════════════════════

    fn unwrap_container(&mut self, tree: &mut Tree, id: NodeId) -> Option<NodeId> {
        let expression = match tree.kind(id) {
            NodeKind::MarkupExpressionContainer { expression } => *expression,
            _ => return None,
        };
        let parent = tree.parent(id)?;
        tree.substitute(parent, id, expression);
        Some(expression)
    }

    /// Containers wrapping a `compute` call inside a return-bearing component
    /// body are hoisted into a named constant; every other container unwraps
    /// to its inner expression.
    fn visit_container(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
    ) -> Result<Option<NodeId>, RewriteError> {
        let scopes = self.scopes;
        let expression = match tree.kind(id) {
            NodeKind::MarkupExpressionContainer { expression } => *expression,
            _ => return Ok(None),
        };
        if !predicates::is_module_method(tree, scopes, expression, runtime::COMPUTE) {
            return Ok(self.unwrap_container(tree, id));
        }

        let component = match predicates::find_component_root(tree, id) {
            Some(component) => component,
            None => return Ok(None),
        };
        let block = match predicates::find_component_block(tree, component) {
            Some(block) => block,
            None => {
                return Err(RewriteError::new(
                    ERR_HOIST_BLOCK,
                    "no enclosing block statement to hoist the computed expression into",
                    Some(id),
                ))
            }
        };
        let body = match tree.kind(block) {
            NodeKind::BlockStatement { body } => body.clone(),
            _ => return Ok(None),
        };
        let return_index = match body
            .iter()
            .position(|&stmt| matches!(tree.kind(stmt), NodeKind::ReturnStatement { .. }))
        {
            Some(index) => index,
            None => return Ok(None),
        };

        self.ctx.hoist_count += 1;
        let name = runtime::hoisted_binding_name(self.ctx.hoist_count);

        // Bring the extracted expression to final form before it moves out of
        // the markup position (nested markup, reads, shorthand deps).
        self.walk(tree, expression, PassSet::HoistPrep)?;

        // Default placement is right before the return; when the container
        // feeds another variable's initializer, the hoisted constant must land
        // before that declaration instead.
        let mut insert_at = return_index;
        if let Some(declarator) = predicates::find_parent_variable_declarator(tree, id) {
            let outer_name = match tree.kind(declarator) {
                NodeKind::VariableDeclarator { id: pattern, .. } => match tree.kind(*pattern) {
                    NodeKind::Identifier { name } => Some(name.clone()),
                    _ => None,
                },
                _ => None,
            };
            if let Some(outer_name) = outer_name {
                let declared_at = body.iter().position(|&stmt| {
                    match tree.kind(stmt) {
                        NodeKind::VariableDeclaration { declarations, .. } => {
                            declarations.iter().any(|&dec| {
                                matches!(
                                    tree.kind(dec),
                                    NodeKind::VariableDeclarator { id: pattern, .. }
                                        if matches!(
                                            tree.kind(*pattern),
                                            NodeKind::Identifier { name } if *name == outer_name
                                        )
                                )
                            })
                        }
                        _ => false,
                    }
                });
                if let Some(index) = declared_at {
                    insert_at = index;
                }
            }
        }

        tree.replace(
            id,
            NodeKind::Identifier { name: name.clone() },
        );
        let declaration = tree.const_decl(&name, expression);
        let mut new_body = body;
        new_body.insert(insert_at, declaration);
        tree.replace(
            block,
            NodeKind::BlockStatement { body: new_body },
        );
        Ok(Some(id))
    }
}
