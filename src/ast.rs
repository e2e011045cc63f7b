//! Arena-backed syntax tree for the rewriter.
//!
//! Nodes live in a flat arena and reference each other by `NodeId`. Node
//! identity is the id: two occurrences of the same name are distinct nodes,
//! which is what the exclusion predicates compare ("is this occurrence already
//! inside the dependency array of its own enclosing call"). Rewrites replace a
//! node's kind in place; the id keeps its position in the parent, so the
//! traversal can re-enter the replacement.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Const,
    Let,
    Var,
}

/// Markup attribute names keep their namespaced form until lowering, where
/// they collapse to the `"namespace:name"` string key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeName {
    Plain(String),
    Namespaced { namespace: String, name: String },
}

impl AttributeName {
    pub fn as_key(&self) -> String {
        match self {
            AttributeName::Plain(name) => name.clone(),
            AttributeName::Namespaced { namespace, name } => format!("{}:{}", namespace, name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },
    Identifier {
        name: String,
    },
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    /// `quasis` has one more entry than `expressions`.
    TemplateLiteral {
        quasis: Vec<String>,
        expressions: Vec<NodeId>,
    },
    ArrayExpression {
        elements: Vec<NodeId>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    ObjectProperty {
        key: NodeId,
        value: NodeId,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    ArrowFunction {
        params: Vec<NodeId>,
        body: NodeId,
    },
    FunctionDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
    },
    VariableDeclaration {
        kind: DeclarationKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },
    AssignmentExpression {
        left: NodeId,
        right: NodeId,
    },
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    ImportDeclaration {
        source: String,
        specifiers: Vec<NodeId>,
    },
    ImportSpecifier {
        imported: String,
        local: NodeId,
    },
    ImportNamespaceSpecifier {
        local: NodeId,
    },
    MarkupElement {
        name: String,
        attributes: Vec<NodeId>,
        children: Vec<NodeId>,
    },
    MarkupAttribute {
        name: AttributeName,
        value: Option<NodeId>,
    },
    MarkupExpressionContainer {
        expression: NodeId,
    },
    MarkupText {
        value: String,
    },
}

impl NodeKind {
    /// Child ids in syntactic order.
    pub fn child_ids(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { body } => body.clone(),
            NodeKind::Identifier { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::MarkupText { .. } => Vec::new(),
            NodeKind::TemplateLiteral { expressions, .. } => expressions.clone(),
            NodeKind::ArrayExpression { elements } => elements.clone(),
            NodeKind::ObjectExpression { properties } => properties.clone(),
            NodeKind::ObjectProperty { key, value } => vec![*key, *value],
            NodeKind::ObjectPattern { properties } => properties.clone(),
            NodeKind::MemberExpression {
                object, property, ..
            } => vec![*object, *property],
            NodeKind::CallExpression { callee, arguments } => {
                let mut out = vec![*callee];
                out.extend(arguments.iter().copied());
                out
            }
            NodeKind::ArrowFunction { params, body } => {
                let mut out = params.clone();
                out.push(*body);
                out
            }
            NodeKind::FunctionDeclaration { id, params, body } => {
                let mut out = vec![*id];
                out.extend(params.iter().copied());
                out.push(*body);
                out
            }
            NodeKind::VariableDeclaration { declarations, .. } => declarations.clone(),
            NodeKind::VariableDeclarator { id, init } => {
                let mut out = vec![*id];
                if let Some(init) = init {
                    out.push(*init);
                }
                out
            }
            NodeKind::AssignmentExpression { left, right } => vec![*left, *right],
            NodeKind::BinaryExpression { left, right, .. } => vec![*left, *right],
            NodeKind::LogicalExpression { left, right, .. } => vec![*left, *right],
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![*test, *consequent, *alternate],
            NodeKind::BlockStatement { body } => body.clone(),
            NodeKind::ReturnStatement { argument } => argument.iter().copied().collect(),
            NodeKind::ExpressionStatement { expression } => vec![*expression],
            NodeKind::ImportDeclaration { specifiers, .. } => specifiers.clone(),
            NodeKind::ImportSpecifier { local, .. } => vec![*local],
            NodeKind::ImportNamespaceSpecifier { local } => vec![*local],
            NodeKind::MarkupElement {
                attributes,
                children,
                ..
            } => {
                let mut out = attributes.clone();
                out.extend(children.iter().copied());
                out
            }
            NodeKind::MarkupAttribute { value, .. } => value.iter().copied().collect(),
            NodeKind::MarkupExpressionContainer { expression } => vec![*expression],
        }
    }

    fn remove_child(&mut self, child: NodeId) {
        fn drop_from(list: &mut Vec<NodeId>, child: NodeId) {
            list.retain(|&c| c != child);
        }
        match self {
            NodeKind::Program { body } => drop_from(body, child),
            NodeKind::TemplateLiteral { expressions, .. } => drop_from(expressions, child),
            NodeKind::ArrayExpression { elements } => drop_from(elements, child),
            NodeKind::ObjectExpression { properties } => drop_from(properties, child),
            NodeKind::ObjectPattern { properties } => drop_from(properties, child),
            NodeKind::CallExpression { arguments, .. } => drop_from(arguments, child),
            NodeKind::VariableDeclaration { declarations, .. } => drop_from(declarations, child),
            NodeKind::VariableDeclarator { init, .. } => {
                if *init == Some(child) {
                    *init = None;
                }
            }
            NodeKind::BlockStatement { body } => drop_from(body, child),
            NodeKind::ReturnStatement { argument } => {
                if *argument == Some(child) {
                    *argument = None;
                }
            }
            NodeKind::ImportDeclaration { specifiers, .. } => drop_from(specifiers, child),
            NodeKind::MarkupElement {
                attributes,
                children,
                ..
            } => {
                drop_from(attributes, child);
                drop_from(children, child);
            }
            NodeKind::MarkupAttribute { value, .. } => {
                if *value == Some(child) {
                    *value = None;
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node and adopt its children.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, parent: None });
        self.adopt_children(id);
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.index()].kind.child_ids()
    }

    /// Replace the node at `id` in place. The id keeps its position in the
    /// parent; children named by the new kind are re-adopted.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
        self.adopt_children(id);
    }

    /// Remove a node from its parent's child list (the traversal contract's
    /// node removal, used to drop blank markup text).
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent {
            self.nodes[parent.index()].kind.remove_child(id);
            self.nodes[id.index()].parent = None;
        }
    }

    /// Swap `old` for `new` in `parent`'s child references and adopt `new`.
    /// `old` keeps its own subtree; callers re-attach it (arrow bodies,
    /// hoisted initializers) or let it go dead.
    pub fn substitute(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        remap_children(&mut self.nodes[parent.index()].kind, &[old], &[new]);
        self.nodes[new.index()].parent = Some(parent);
        if self.nodes[old.index()].parent == Some(parent) {
            self.nodes[old.index()].parent = None;
        }
    }

    fn adopt_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.nodes[child.index()].parent = Some(id);
        }
    }

    /// Upward parent-chain scan starting at the node itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Deep copy of a subtree. Dependency arrays carry copies of their
    /// representative nodes: an arena cannot place one id at two positions.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut kind = self.kind(id).clone();
        let originals = kind.child_ids();
        let copies: Vec<NodeId> = originals
            .iter()
            .map(|&child| self.clone_subtree(child))
            .collect();
        remap_children(&mut kind, &originals, &copies);
        self.alloc(kind)
    }

    /// Nested JSON projection of a subtree, for tests and debugging.
    pub fn to_json(&self, id: NodeId) -> serde_json::Value {
        use serde_json::json;
        match self.kind(id) {
            NodeKind::Program { body } => json!({
                "type": "program",
                "body": self.json_list(body),
            }),
            NodeKind::Identifier { name } => json!({ "type": "identifier", "name": name }),
            NodeKind::StringLiteral { value } => json!({ "type": "string", "value": value }),
            NodeKind::NumberLiteral { value } => json!({ "type": "number", "value": value }),
            NodeKind::BooleanLiteral { value } => json!({ "type": "boolean", "value": value }),
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => json!({
                "type": "template-literal",
                "quasis": quasis,
                "expressions": self.json_list(expressions),
            }),
            NodeKind::ArrayExpression { elements } => json!({
                "type": "array-expression",
                "elements": self.json_list(elements),
            }),
            NodeKind::ObjectExpression { properties } => json!({
                "type": "object-expression",
                "properties": self.json_list(properties),
            }),
            NodeKind::ObjectProperty { key, value } => json!({
                "type": "object-property",
                "key": self.to_json(*key),
                "value": self.to_json(*value),
            }),
            NodeKind::ObjectPattern { properties } => json!({
                "type": "object-pattern",
                "properties": self.json_list(properties),
            }),
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => json!({
                "type": "member-expression",
                "object": self.to_json(*object),
                "property": self.to_json(*property),
                "computed": computed,
            }),
            NodeKind::CallExpression { callee, arguments } => json!({
                "type": "call-expression",
                "callee": self.to_json(*callee),
                "arguments": self.json_list(arguments),
            }),
            NodeKind::ArrowFunction { params, body } => json!({
                "type": "arrow-function",
                "params": self.json_list(params),
                "body": self.to_json(*body),
            }),
            NodeKind::FunctionDeclaration { id: fid, params, body } => json!({
                "type": "function-declaration",
                "id": self.to_json(*fid),
                "params": self.json_list(params),
                "body": self.to_json(*body),
            }),
            NodeKind::VariableDeclaration { kind, declarations } => json!({
                "type": "variable-declaration",
                "kind": match kind {
                    DeclarationKind::Const => "const",
                    DeclarationKind::Let => "let",
                    DeclarationKind::Var => "var",
                },
                "declarations": self.json_list(declarations),
            }),
            NodeKind::VariableDeclarator { id: did, init } => json!({
                "type": "variable-declarator",
                "id": self.to_json(*did),
                "init": init.map(|i| self.to_json(i)),
            }),
            NodeKind::AssignmentExpression { left, right } => json!({
                "type": "assignment-expression",
                "left": self.to_json(*left),
                "right": self.to_json(*right),
            }),
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => json!({
                "type": "binary-expression",
                "operator": operator,
                "left": self.to_json(*left),
                "right": self.to_json(*right),
            }),
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => json!({
                "type": "logical-expression",
                "operator": operator,
                "left": self.to_json(*left),
                "right": self.to_json(*right),
            }),
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => json!({
                "type": "conditional-expression",
                "test": self.to_json(*test),
                "consequent": self.to_json(*consequent),
                "alternate": self.to_json(*alternate),
            }),
            NodeKind::BlockStatement { body } => json!({
                "type": "block-statement",
                "body": self.json_list(body),
            }),
            NodeKind::ReturnStatement { argument } => json!({
                "type": "return-statement",
                "argument": argument.map(|a| self.to_json(a)),
            }),
            NodeKind::ExpressionStatement { expression } => json!({
                "type": "expression-statement",
                "expression": self.to_json(*expression),
            }),
            NodeKind::ImportDeclaration { source, specifiers } => json!({
                "type": "import-declaration",
                "source": source,
                "specifiers": self.json_list(specifiers),
            }),
            NodeKind::ImportSpecifier { imported, local } => json!({
                "type": "import-specifier",
                "imported": imported,
                "local": self.to_json(*local),
            }),
            NodeKind::ImportNamespaceSpecifier { local } => json!({
                "type": "import-namespace-specifier",
                "local": self.to_json(*local),
            }),
            NodeKind::MarkupElement {
                name,
                attributes,
                children,
            } => json!({
                "type": "markup-element",
                "name": name,
                "attributes": self.json_list(attributes),
                "children": self.json_list(children),
            }),
            NodeKind::MarkupAttribute { name, value } => json!({
                "type": "markup-attribute",
                "name": name.as_key(),
                "value": value.map(|v| self.to_json(v)),
            }),
            NodeKind::MarkupExpressionContainer { expression } => json!({
                "type": "markup-expression-container",
                "expression": self.to_json(*expression),
            }),
            NodeKind::MarkupText { value } => json!({ "type": "markup-text", "value": value }),
        }
    }

    fn json_list(&self, ids: &[NodeId]) -> Vec<serde_json::Value> {
        ids.iter().map(|&id| self.to_json(id)).collect()
    }
}

fn remap_children(kind: &mut NodeKind, originals: &[NodeId], copies: &[NodeId]) {
    let remap = |id: &mut NodeId| {
        if let Some(pos) = originals.iter().position(|o| o == id) {
            *id = copies[pos];
        }
    };
    let remap_vec = |list: &mut Vec<NodeId>| {
        for id in list.iter_mut() {
            if let Some(pos) = originals.iter().position(|o| o == id) {
                *id = copies[pos];
            }
        }
    };
    match kind {
        NodeKind::Program { body } => remap_vec(body),
        NodeKind::TemplateLiteral { expressions, .. } => remap_vec(expressions),
        NodeKind::ArrayExpression { elements } => remap_vec(elements),
        NodeKind::ObjectExpression { properties } => remap_vec(properties),
        NodeKind::ObjectPattern { properties } => remap_vec(properties),
        NodeKind::ObjectProperty { key, value } => {
            remap(key);
            remap(value);
        }
        NodeKind::MemberExpression {
            object, property, ..
        } => {
            remap(object);
            remap(property);
        }
        NodeKind::CallExpression { callee, arguments } => {
            remap(callee);
            remap_vec(arguments);
        }
        NodeKind::ArrowFunction { params, body } => {
            remap_vec(params);
            remap(body);
        }
        NodeKind::FunctionDeclaration { id, params, body } => {
            remap(id);
            remap_vec(params);
            remap(body);
        }
        NodeKind::VariableDeclaration { declarations, .. } => remap_vec(declarations),
        NodeKind::VariableDeclarator { id, init } => {
            remap(id);
            if let Some(init) = init {
                remap(init);
            }
        }
        NodeKind::AssignmentExpression { left, right } => {
            remap(left);
            remap(right);
        }
        NodeKind::BinaryExpression { left, right, .. } => {
            remap(left);
            remap(right);
        }
        NodeKind::LogicalExpression { left, right, .. } => {
            remap(left);
            remap(right);
        }
        NodeKind::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            remap(test);
            remap(consequent);
            remap(alternate);
        }
        NodeKind::BlockStatement { body } => remap_vec(body),
        NodeKind::ReturnStatement { argument } => {
            if let Some(argument) = argument {
                remap(argument);
            }
        }
        NodeKind::ExpressionStatement { expression } => remap(expression),
        NodeKind::ImportDeclaration { specifiers, .. } => remap_vec(specifiers),
        NodeKind::ImportSpecifier { local, .. } => remap(local),
        NodeKind::ImportNamespaceSpecifier { local } => remap(local),
        NodeKind::MarkupElement {
            attributes,
            children,
            ..
        } => {
            remap_vec(attributes);
            remap_vec(children);
        }
        NodeKind::MarkupAttribute { value, .. } => {
            if let Some(value) = value {
                remap(value);
            }
        }
        NodeKind::MarkupExpressionContainer { expression } => remap(expression),
        _ => {}
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDERS
// Construction helpers used by the rewriter and by the host-facing tests.
// ═══════════════════════════════════════════════════════════════════════════════

impl Tree {
    pub fn program(&mut self, body: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::Program { body });
        self.set_root(id);
        id
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Identifier {
            name: name.to_string(),
        })
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.alloc(NodeKind::StringLiteral {
            value: value.to_string(),
        })
    }

    pub fn number(&mut self, value: f64) -> NodeId {
        self.alloc(NodeKind::NumberLiteral { value })
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.alloc(NodeKind::BooleanLiteral { value })
    }

    pub fn template(&mut self, quasis: &[&str], expressions: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::TemplateLiteral {
            quasis: quasis.iter().map(|q| q.to_string()).collect(),
            expressions,
        })
    }

    pub fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::ArrayExpression { elements })
    }

    pub fn object(&mut self, properties: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::ObjectExpression { properties })
    }

    pub fn object_prop(&mut self, key: NodeId, value: NodeId) -> NodeId {
        self.alloc(NodeKind::ObjectProperty { key, value })
    }

    pub fn object_pattern(&mut self, properties: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::ObjectPattern { properties })
    }

    /// Non-computed member access with a fresh property identifier.
    pub fn member(&mut self, object: NodeId, property: &str) -> NodeId {
        let property = self.ident(property);
        self.alloc(NodeKind::MemberExpression {
            object,
            property,
            computed: false,
        })
    }

    pub fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::CallExpression { callee, arguments })
    }

    pub fn arrow(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.alloc(NodeKind::ArrowFunction { params, body })
    }

    pub fn function_decl(&mut self, name: &str, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let id = self.ident(name);
        self.alloc(NodeKind::FunctionDeclaration { id, params, body })
    }

    pub fn declarator(&mut self, id: NodeId, init: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::VariableDeclarator { id, init })
    }

    pub fn var_decl(&mut self, kind: DeclarationKind, declarations: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::VariableDeclaration { kind, declarations })
    }

    /// `const <name> = <init>;`
    pub fn const_decl(&mut self, name: &str, init: NodeId) -> NodeId {
        let id = self.ident(name);
        let declarator = self.declarator(id, Some(init));
        self.var_decl(DeclarationKind::Const, vec![declarator])
    }

    pub fn assign(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::AssignmentExpression { left, right })
    }

    pub fn binary(&mut self, operator: &str, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::BinaryExpression {
            operator: operator.to_string(),
            left,
            right,
        })
    }

    pub fn logical(&mut self, operator: &str, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::LogicalExpression {
            operator: operator.to_string(),
            left,
            right,
        })
    }

    pub fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.alloc(NodeKind::ConditionalExpression {
            test,
            consequent,
            alternate,
        })
    }

    pub fn block(&mut self, body: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::BlockStatement { body })
    }

    pub fn ret(&mut self, argument: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::ReturnStatement { argument })
    }

    pub fn expr_stmt(&mut self, expression: NodeId) -> NodeId {
        self.alloc(NodeKind::ExpressionStatement { expression })
    }

    /// `import { a as b, ... } from "<source>";` — pairs are (imported, local).
    pub fn import_named(&mut self, source: &str, names: &[(&str, &str)]) -> NodeId {
        let specifiers = names
            .iter()
            .map(|(imported, local)| {
                let local = self.ident(local);
                self.alloc(NodeKind::ImportSpecifier {
                    imported: imported.to_string(),
                    local,
                })
            })
            .collect();
        self.alloc(NodeKind::ImportDeclaration {
            source: source.to_string(),
            specifiers,
        })
    }

    pub fn markup_element(
        &mut self,
        name: &str,
        attributes: Vec<NodeId>,
        children: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(NodeKind::MarkupElement {
            name: name.to_string(),
            attributes,
            children,
        })
    }

    pub fn markup_attr(&mut self, name: &str, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::MarkupAttribute {
            name: AttributeName::Plain(name.to_string()),
            value,
        })
    }

    pub fn markup_attr_ns(&mut self, namespace: &str, name: &str, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::MarkupAttribute {
            name: AttributeName::Namespaced {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            value,
        })
    }

    pub fn markup_container(&mut self, expression: NodeId) -> NodeId {
        self.alloc(NodeKind::MarkupExpressionContainer { expression })
    }

    pub fn markup_text(&mut self, value: &str) -> NodeId {
        self.alloc(NodeKind::MarkupText {
            value: value.to_string(),
        })
    }
}
