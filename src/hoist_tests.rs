//! Hoisting tests: computed expressions in markup positions move into named
//! constants declared before first use.

#[cfg(test)]
mod tests {
    use crate::ast::{NodeId, NodeKind, Tree};
    use crate::error::ERR_HOIST_BLOCK;
    use crate::pipeline::{rewrite_module, rewrite_modules};
    use crate::runtime;
    use serde_json::json;

    fn observable_decl(tree: &mut Tree, name: &str) -> NodeId {
        let callee = tree.ident(runtime::OBSERVABLE);
        let zero = tree.number(0.0);
        let init = tree.call(callee, vec![zero]);
        tree.const_decl(name, init)
    }

    /// `compute(() => count.value, [count])`
    fn explicit_compute(tree: &mut Tree) -> NodeId {
        let callee = tree.ident(runtime::COMPUTE);
        let count = tree.ident("count");
        let read = tree.member(count, runtime::VALUE_MEMBER);
        let thunk = tree.arrow(vec![], read);
        let dep = tree.ident("count");
        let deps = tree.array(vec![dep]);
        tree.call(callee, vec![thunk, deps])
    }

    fn block_body(tree: &Tree, block: NodeId) -> Vec<NodeId> {
        match tree.kind(block) {
            NodeKind::BlockStatement { body } => body.clone(),
            other => panic!("expected block statement, found {:?}", other),
        }
    }

    fn declared_name(tree: &Tree, stmt: NodeId) -> String {
        match tree.kind(stmt) {
            NodeKind::VariableDeclaration { declarations, .. } => {
                match tree.kind(declarations[0]) {
                    NodeKind::VariableDeclarator { id, .. } => match tree.kind(*id) {
                        NodeKind::Identifier { name } => name.clone(),
                        _ => panic!("expected identifier pattern"),
                    },
                    _ => panic!("expected declarator"),
                }
            }
            other => panic!("expected variable declaration, found {:?}", other),
        }
    }

    fn element_children(tree: &Tree, call: NodeId) -> Vec<NodeId> {
        match tree.kind(call) {
            NodeKind::CallExpression { arguments, .. } => match tree.kind(arguments[2]) {
                NodeKind::ArrayExpression { elements } => elements.clone(),
                _ => panic!("expected children array"),
            },
            _ => panic!("expected lowered element call"),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Placement
    // ═══════════════════════════════════════════════════════════════════════════════

    /// A computed child of returned markup hoists to a constant right before
    /// the return; the markup slot collapses to the constant's name.
    #[test]
    fn computed_markup_child_hoists_before_the_return() {
        let mut tree = Tree::new();
        let count_decl = observable_decl(&mut tree, "count");
        let compute = explicit_compute(&mut tree);
        let container = tree.markup_container(compute);
        let element = tree.markup_element("div", vec![], vec![container]);
        let ret = tree.ret(Some(element));
        let props = tree.ident("props");
        let block = tree.block(vec![count_decl, ret]);
        let component = tree.function_decl("Component_View", vec![props], block);
        tree.program(vec![component]);

        let report = rewrite_module(&mut tree).expect("rewrite succeeds");
        assert_eq!(report.hoisted, 1);

        let body = block_body(&tree, block);
        assert_eq!(body.len(), 3);
        assert_eq!(declared_name(&tree, body[1]), "computed__ref_1");
        assert!(matches!(tree.kind(body[2]), NodeKind::ReturnStatement { .. }));

        // The hoisted constant still holds the compute call.
        assert!(matches!(tree.kind(compute), NodeKind::CallExpression { .. }));

        let children = element_children(&tree, element);
        assert_eq!(
            tree.to_json(children[0]),
            json!({ "type": "identifier", "name": "computed__ref_1" })
        );
    }

    /// When the markup feeds another variable's initializer, the hoisted
    /// constant lands before that declaration, not before the return.
    #[test]
    fn hoisted_constant_precedes_the_consuming_declaration() {
        let mut tree = Tree::new();
        let count_decl = observable_decl(&mut tree, "count");
        let compute = explicit_compute(&mut tree);
        let container = tree.markup_container(compute);
        let element = tree.markup_element("ul", vec![], vec![container]);
        let rows_decl = tree.const_decl("rows", element);
        let rows = tree.ident("rows");
        let ret = tree.ret(Some(rows));
        let props = tree.ident("props");
        let block = tree.block(vec![count_decl, rows_decl, ret]);
        let component = tree.function_decl("Component_List", vec![props], block);
        tree.program(vec![component]);

        let report = rewrite_module(&mut tree).expect("rewrite succeeds");
        assert_eq!(report.hoisted, 1);

        let body = block_body(&tree, block);
        assert_eq!(body.len(), 4);
        assert_eq!(declared_name(&tree, body[1]), "computed__ref_1");
        assert_eq!(declared_name(&tree, body[2]), "rows");
    }

    /// Hoisted names are numbered per unit, not process-wide: two units
    /// rewritten in one batch both get `computed__ref_1`.
    #[test]
    fn hoist_counter_is_scoped_to_the_unit() {
        let build = || {
            let mut tree = Tree::new();
            let count_decl = observable_decl(&mut tree, "count");
            let compute = explicit_compute(&mut tree);
            let container = tree.markup_container(compute);
            let element = tree.markup_element("div", vec![], vec![container]);
            let ret = tree.ret(Some(element));
            let props = tree.ident("props");
            let block = tree.block(vec![count_decl, ret]);
            let component = tree.function_decl("Component_View", vec![props], block);
            tree.program(vec![component]);
            (tree, block)
        };
        let (first, first_block) = build();
        let (second, second_block) = build();

        let mut units = vec![first, second];
        let reports = rewrite_modules(&mut units);
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(report.as_ref().expect("rewrite succeeds").hoisted, 1);
        }
        for (tree, block) in [(&units[0], first_block), (&units[1], second_block)] {
            let body = block_body(tree, block);
            assert_eq!(declared_name(tree, body[1]), "computed__ref_1");
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Containers that do not hoist
    // ═══════════════════════════════════════════════════════════════════════════════

    /// No return statement means no anchor: the container stays as-is rather
    /// than landing in a spot the runtime would never evaluate.
    #[test]
    fn component_without_return_leaves_the_container() {
        let mut tree = Tree::new();
        let count_decl = observable_decl(&mut tree, "count");
        let compute = explicit_compute(&mut tree);
        let container = tree.markup_container(compute);
        let element = tree.markup_element("div", vec![], vec![container]);
        let stmt = tree.expr_stmt(element);
        let props = tree.ident("props");
        let block = tree.block(vec![count_decl, stmt]);
        let component = tree.function_decl("Component_Quiet", vec![props], block);
        tree.program(vec![component]);

        let report = rewrite_module(&mut tree).expect("rewrite succeeds");
        assert_eq!(report.hoisted, 0);
        assert!(matches!(
            tree.kind(container),
            NodeKind::MarkupExpressionContainer { .. }
        ));
    }

    #[test]
    fn container_outside_a_component_is_left_alone() {
        let mut tree = Tree::new();
        let count_decl = observable_decl(&mut tree, "count");
        let compute = explicit_compute(&mut tree);
        let container = tree.markup_container(compute);
        let element = tree.markup_element("div", vec![], vec![container]);
        let stmt = tree.expr_stmt(element);
        tree.program(vec![count_decl, stmt]);

        let report = rewrite_module(&mut tree).expect("rewrite succeeds");
        assert_eq!(report.hoisted, 0);
        assert!(matches!(
            tree.kind(container),
            NodeKind::MarkupExpressionContainer { .. }
        ));
    }

    /// An expression-bodied arrow component has no block to hoist into.
    #[test]
    fn arrow_body_without_block_is_a_fatal_error() {
        let mut tree = Tree::new();
        let compute = explicit_compute(&mut tree);
        let container = tree.markup_container(compute);
        let element = tree.markup_element("div", vec![], vec![container]);
        let arrow = tree.arrow(vec![], element);
        let decl = tree.const_decl("Component_X", arrow);
        tree.program(vec![decl]);

        let error = rewrite_module(&mut tree).expect_err("hoist target is missing");
        assert_eq!(error.code, ERR_HOIST_BLOCK);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // End to end
    // ═══════════════════════════════════════════════════════════════════════════════

    /// `{count + 1}` is wrapped into a compute call in place, then hoisted,
    /// with the observable read in `.value` form and the dep a bare name.
    #[test]
    fn bare_expression_is_wrapped_then_hoisted() {
        let mut tree = Tree::new();
        let count_decl = observable_decl(&mut tree, "count");
        let count = tree.ident("count");
        let one = tree.number(1.0);
        let sum = tree.binary("+", count, one);
        let container = tree.markup_container(sum);
        let element = tree.markup_element("p", vec![], vec![container]);
        let ret = tree.ret(Some(element));
        let props = tree.ident("props");
        let block = tree.block(vec![count_decl, ret]);
        let component = tree.function_decl("Component_Auto", vec![props], block);
        tree.program(vec![component]);

        let report = rewrite_module(&mut tree).expect("rewrite succeeds");
        assert_eq!(report.hoisted, 1);
        assert!(report.diagnostics.is_empty());

        let body = block_body(&tree, block);
        assert_eq!(body.len(), 3);
        let hoisted = body[1];
        assert_eq!(declared_name(&tree, hoisted), "computed__ref_1");
        let init = match tree.kind(hoisted) {
            NodeKind::VariableDeclaration { declarations, .. } => {
                match tree.kind(declarations[0]) {
                    NodeKind::VariableDeclarator {
                        init: Some(init), ..
                    } => *init,
                    _ => panic!("expected initialized declarator"),
                }
            }
            _ => panic!("expected variable declaration"),
        };
        assert_eq!(
            tree.to_json(init),
            json!({
                "type": "call-expression",
                "callee": {
                    "type": "member-expression",
                    "object": { "type": "identifier", "name": runtime::NAMESPACE },
                    "property": { "type": "identifier", "name": runtime::COMPUTE },
                    "computed": false,
                },
                "arguments": [
                    {
                        "type": "arrow-function",
                        "params": [],
                        "body": {
                            "type": "binary-expression",
                            "operator": "+",
                            "left": {
                                "type": "member-expression",
                                "object": { "type": "identifier", "name": "count" },
                                "property": { "type": "identifier", "name": "value" },
                                "computed": false,
                            },
                            "right": { "type": "number", "value": 1.0 },
                        },
                    },
                    {
                        "type": "array-expression",
                        "elements": [{ "type": "identifier", "name": "count" }],
                    },
                ],
            })
        );

        let children = element_children(&tree, element);
        assert_eq!(
            tree.to_json(children[0]),
            json!({ "type": "identifier", "name": "computed__ref_1" })
        );
    }
}
