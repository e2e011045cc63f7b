//! Node-context predicates.
//!
//! The kernel is a single upward parent-chain scan plus the runtime-call
//! recognizer; the classification layer answers "is this identifier a prop
//! read, an observable read, or inside a context the rewriter must leave
//! alone". Every predicate fails closed: missing context (no enclosing
//! component, no binding) yields `false`, never an error.

use crate::ast::{NodeId, NodeKind, Tree};
use crate::runtime;
use crate::scope::{Binding, BindingKind, BindingResolver};

// ═══════════════════════════════════════════════════════════════════════════════
// KERNEL
// ═══════════════════════════════════════════════════════════════════════════════

/// First-hit upward scan, starting at the node itself and bounded by the
/// tree root.
pub fn match_ancestors<F>(tree: &Tree, id: NodeId, pred: F) -> bool
where
    F: Fn(NodeId) -> bool,
{
    tree.ancestors(id).any(pred)
}

/// True iff `id` is a call to the runtime primitive `name`, either through a
/// named import from the runtime module (renamed imports are recognized via
/// the binding's declaration), through a bare unbound identifier with the
/// primitive's surface name, or through the runtime namespace
/// (`Pulse.<name>(...)`).
pub fn is_module_method(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    id: NodeId,
    name: &str,
) -> bool {
    let callee = match tree.kind(id) {
        NodeKind::CallExpression { callee, .. } => *callee,
        _ => return false,
    };
    match tree.kind(callee) {
        NodeKind::Identifier { name: callee_name } => {
            match scopes.resolve(tree, callee, callee_name) {
                None => callee_name == name,
                Some(binding) => {
                    if let BindingKind::Module { source } = &binding.kind {
                        if source != runtime::MODULE {
                            return false;
                        }
                        matches!(
                            tree.kind(binding.declaration),
                            NodeKind::ImportSpecifier { imported, .. } if imported == name
                        )
                    } else {
                        false
                    }
                }
            }
        }
        NodeKind::MemberExpression {
            object,
            property,
            computed: false,
        } => {
            matches!(tree.kind(*object), NodeKind::Identifier { name } if name == runtime::NAMESPACE)
                && matches!(tree.kind(*property), NodeKind::Identifier { name: prop } if prop == name)
        }
        _ => false,
    }
}

fn is_wrapped_in_call(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId, name: &str) -> bool {
    match_ancestors(tree, id, |a| is_module_method(tree, scopes, a, name))
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXCLUSION CONTEXTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Inside the dependency-array argument of a `compute`/`effect` call, or the
/// first argument of a `conditional` call (its dependency slot).
pub fn is_in_dependency_array(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    match_ancestors(tree, id, |a| {
        if !matches!(tree.kind(a), NodeKind::ArrayExpression { .. }) {
            return false;
        }
        let parent = match tree.parent(a) {
            Some(parent) => parent,
            None => return false,
        };
        if is_module_method(tree, scopes, parent, runtime::COMPUTE)
            || is_module_method(tree, scopes, parent, runtime::EFFECT)
        {
            return true;
        }
        if is_module_method(tree, scopes, parent, runtime::CONDITIONAL) {
            if let NodeKind::CallExpression { arguments, .. } = tree.kind(parent) {
                return arguments.first() == Some(&a);
            }
        }
        false
    })
}

/// Inside the condition slot of a `conditional` call, marked by the
/// `__condition__` object key.
pub fn is_in_conditional_condition(tree: &Tree, id: NodeId) -> bool {
    match_ancestors(tree, id, |a| {
        if let NodeKind::ObjectProperty { key, .. } = tree.kind(a) {
            matches!(
                tree.kind(*key),
                NodeKind::StringLiteral { value } if value == runtime::CONDITION_KEY
            ) || matches!(
                tree.kind(*key),
                NodeKind::Identifier { name } if name == runtime::CONDITION_KEY
            )
        } else {
            false
        }
    })
}

pub fn is_wrapped_in_computed(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    is_wrapped_in_call(tree, scopes, id, runtime::COMPUTE)
}

pub fn is_wrapped_in_effect(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    is_wrapped_in_call(tree, scopes, id, runtime::EFFECT)
}

pub fn is_wrapped_in_observe(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    is_wrapped_in_call(tree, scopes, id, runtime::OBSERVE)
}

pub fn is_wrapped_in_prop_value_getter(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    id: NodeId,
) -> bool {
    is_wrapped_in_call(tree, scopes, id, runtime::GET_PROP_VALUE)
}

pub fn is_in_component_props(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    is_wrapped_in_call(tree, scopes, id, runtime::REGISTER_COMPONENT)
}

pub fn is_in_observable_array(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    is_wrapped_in_call(tree, scopes, id, runtime::OBSERVABLE_ARRAY)
}

/// Inside a `<binding>.set(...)` call.
pub fn is_wrapped_in_setter(tree: &Tree, id: NodeId) -> bool {
    match_ancestors(tree, id, |a| {
        if let NodeKind::CallExpression { callee, .. } = tree.kind(a) {
            if let NodeKind::MemberExpression {
                property,
                computed: false,
                ..
            } = tree.kind(*callee)
            {
                return matches!(
                    tree.kind(*property),
                    NodeKind::Identifier { name } if name == runtime::SET_MEMBER
                );
            }
        }
        false
    })
}

/// Directly under a markup attribute or expression container; these
/// positions are handled by the markup lowering itself.
pub fn is_in_markup_attribute(tree: &Tree, id: NodeId) -> bool {
    matches!(
        tree.parent(id).map(|p| tree.kind(p)),
        Some(NodeKind::MarkupExpressionContainer { .. }) | Some(NodeKind::MarkupAttribute { .. })
    )
}

/// Part of a `.value` member access (already in final read form).
pub fn is_value_access(tree: &Tree, id: NodeId) -> bool {
    member_property_is(tree, id, runtime::VALUE_MEMBER)
}

/// Part of a `.set` member access (already in final write form).
pub fn is_setter_access(tree: &Tree, id: NodeId) -> bool {
    member_property_is(tree, id, runtime::SET_MEMBER)
}

fn member_property_is(tree: &Tree, id: NodeId, name: &str) -> bool {
    if let Some(parent) = tree.parent(id) {
        if let NodeKind::MemberExpression { property, .. } = tree.kind(parent) {
            return matches!(
                tree.kind(*property),
                NodeKind::Identifier { name: prop } if prop == name
            );
        }
    }
    false
}

/// The element being collected into an `observableArray` initializer.
pub fn is_observable_array_data(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    let parent = match tree.parent(id) {
        Some(parent) => parent,
        None => return false,
    };
    if !is_module_method(tree, scopes, parent, runtime::OBSERVABLE_ARRAY) {
        return false;
    }
    match tree.kind(parent) {
        NodeKind::CallExpression { arguments, .. } => arguments.first() == Some(&id),
        _ => false,
    }
}

pub fn is_assignment_target(tree: &Tree, id: NodeId) -> bool {
    matches!(
        tree.parent(id).map(|p| tree.kind(p)),
        Some(NodeKind::AssignmentExpression { left, .. }) if *left == id
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// Function declarations, and variable declarations whose first declarator
/// initializes an arrow function.
pub fn is_function_like(tree: &Tree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::FunctionDeclaration { .. } => true,
        NodeKind::VariableDeclaration { declarations, .. } => declarations
            .first()
            .map(|&decl| {
                matches!(
                    tree.kind(decl),
                    NodeKind::VariableDeclarator { init: Some(init), .. }
                        if matches!(tree.kind(*init), NodeKind::ArrowFunction { .. })
                )
            })
            .unwrap_or(false),
        _ => false,
    }
}

pub fn is_component_function(tree: &Tree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::FunctionDeclaration { id: fn_id, .. } => {
            matches!(tree.kind(*fn_id), NodeKind::Identifier { name } if runtime::is_component_name(name))
        }
        NodeKind::VariableDeclaration { declarations, .. } => declarations
            .first()
            .map(|&decl| match tree.kind(decl) {
                NodeKind::VariableDeclarator {
                    id: decl_id,
                    init: Some(init),
                } => {
                    matches!(tree.kind(*decl_id), NodeKind::Identifier { name } if runtime::is_component_name(name))
                        && matches!(tree.kind(*init), NodeKind::ArrowFunction { .. })
                }
                _ => false,
            })
            .unwrap_or(false),
        _ => false,
    }
}

pub fn find_nearest_function(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id).find(|&a| is_function_like(tree, a))
}

/// In a function nested inside a component (event handlers and the like);
/// computed wrapping does not reach into those.
pub fn is_inner_function(tree: &Tree, id: NodeId) -> bool {
    match find_nearest_function(tree, id) {
        Some(function) => !is_component_function(tree, function),
        None => false,
    }
}

pub fn find_component_root(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id).find(|&a| is_component_function(tree, a))
}

/// Parameter list of a component found by [`find_component_root`].
pub fn component_params(tree: &Tree, component: NodeId) -> Vec<NodeId> {
    match tree.kind(component) {
        NodeKind::FunctionDeclaration { params, .. } => params.clone(),
        NodeKind::VariableDeclaration { declarations, .. } => declarations
            .first()
            .and_then(|&decl| match tree.kind(decl) {
                NodeKind::VariableDeclarator { init: Some(init), .. } => {
                    match tree.kind(*init) {
                        NodeKind::ArrowFunction { params, .. } => Some(params.clone()),
                        _ => None,
                    }
                }
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// The component's body block, when it has one.
pub fn find_component_block(tree: &Tree, component: NodeId) -> Option<NodeId> {
    let body = match tree.kind(component) {
        NodeKind::FunctionDeclaration { body, .. } => Some(*body),
        NodeKind::VariableDeclaration { declarations, .. } => {
            declarations.first().and_then(|&decl| match tree.kind(decl) {
                NodeKind::VariableDeclarator { init: Some(init), .. } => {
                    match tree.kind(*init) {
                        NodeKind::ArrowFunction { body, .. } => Some(*body),
                        _ => None,
                    }
                }
                _ => None,
            })
        }
        _ => None,
    }?;
    matches!(tree.kind(body), NodeKind::BlockStatement { .. }).then_some(body)
}

pub fn find_parent_variable_declarator(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id)
        .skip(1)
        .find(|&a| matches!(tree.kind(a), NodeKind::VariableDeclarator { .. }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// REACTIVE CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

fn param_name(tree: &Tree, param: NodeId) -> Option<&str> {
    match tree.kind(param) {
        NodeKind::Identifier { name } => Some(name),
        _ => None,
    }
}

/// True iff `id` reads the enclosing component's first parameter, under one
/// of three surface shapes: destructured in the parameter list, accessed as
/// `<param>.<field>`, or destructured in the body from the parameter.
pub fn is_prop_identifier(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    let name = match tree.kind(id) {
        NodeKind::Identifier { name } => name.clone(),
        _ => return false,
    };
    let component = match find_component_root(tree, id) {
        Some(component) => component,
        None => return false,
    };
    let params = component_params(tree, component);
    let first_param = match params.first() {
        Some(&param) => param,
        None => return false,
    };

    let parent = tree.parent(id);
    let member_object = parent.and_then(|p| match tree.kind(p) {
        NodeKind::MemberExpression {
            object,
            computed: false,
            ..
        } => Some(*object),
        _ => None,
    });
    let binding_name = match member_object {
        Some(object) => match tree.kind(object) {
            NodeKind::Identifier { name } => name.clone(),
            _ => return false,
        },
        None => name.clone(),
    };

    let binding = match scopes.resolve(tree, id, &binding_name) {
        Some(binding) => binding,
        None => return false,
    };

    // Shape 1: destructured directly in the parameter list.
    if matches!(tree.kind(first_param), NodeKind::ObjectPattern { .. })
        && binding.declaration == first_param
    {
        return binding.is_reference(id);
    }

    if member_object.is_some() {
        // Shape 2: accessed as `<param>.<field>`.
        let param = match param_name(tree, first_param) {
            Some(param) => param,
            None => return false,
        };
        if name == param {
            return false;
        }
        binding.name == param
    } else {
        // Shape 3: destructured in the body from a local re-binding of the
        // parameter. Occurrences inside the destructuring pattern itself are
        // defining, not reads.
        if matches!(
            parent.map(|p| tree.kind(p)),
            Some(NodeKind::ObjectProperty { .. }) | Some(NodeKind::ObjectPattern { .. })
        ) {
            return false;
        }
        let param = match param_name(tree, first_param) {
            Some(param) => param,
            None => return false,
        };
        if let NodeKind::VariableDeclarator {
            id: pattern,
            init: Some(init),
        } = tree.kind(binding.declaration)
        {
            if matches!(tree.kind(*pattern), NodeKind::ObjectPattern { .. })
                && matches!(tree.kind(*init), NodeKind::Identifier { name } if name == param)
            {
                return true;
            }
        }
        false
    }
}

/// True iff the binding was created by a declarator whose initializer calls
/// the runtime's observable constructors.
pub fn is_observable_binding(tree: &Tree, scopes: &dyn BindingResolver, binding: &Binding) -> bool {
    if let NodeKind::VariableDeclarator {
        init: Some(init), ..
    } = tree.kind(binding.declaration)
    {
        is_module_method(tree, scopes, *init, runtime::OBSERVABLE)
            || is_module_method(tree, scopes, *init, runtime::OBSERVABLE_ARRAY)
    } else {
        false
    }
}

/// True iff `id` is a recorded reference of an observable-producing binding.
pub fn is_observable_ref(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId) -> bool {
    let name = match tree.kind(id) {
        NodeKind::Identifier { name } => name,
        _ => return false,
    };
    match scopes.resolve(tree, id, name) {
        Some(binding) => {
            is_observable_binding(tree, scopes, binding) && binding.is_reference(id)
        }
        None => false,
    }
}

/// Whether any declarator in the unit initializes `name` from an observable
/// constructor. Used by assignment rewriting to catch writes to observables
/// that reach the assignment through a non-declarator binding.
pub fn observable_declared_anywhere(
    tree: &Tree,
    scopes: &dyn BindingResolver,
    root: NodeId,
    name: &str,
) -> bool {
    fn walk(tree: &Tree, scopes: &dyn BindingResolver, id: NodeId, name: &str) -> bool {
        if let NodeKind::VariableDeclarator {
            id: pattern,
            init: Some(init),
        } = tree.kind(id)
        {
            if matches!(tree.kind(*pattern), NodeKind::Identifier { name: n } if n == name)
                && (is_module_method(tree, scopes, *init, runtime::OBSERVABLE)
                    || is_module_method(tree, scopes, *init, runtime::OBSERVABLE_ARRAY))
            {
                return true;
            }
        }
        tree.children(id)
            .into_iter()
            .any(|child| walk(tree, scopes, child, name))
    }
    walk(tree, scopes, root, name)
}
