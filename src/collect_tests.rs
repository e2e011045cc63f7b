//! Dependency collector tests.

#[cfg(test)]
mod tests {
    use crate::ast::{NodeId, Tree};
    use crate::collect::{self, DepSet};
    use crate::error::ERR_MEMBER_SHAPE;
    use crate::runtime;
    use crate::scope::ScopeIndex;

    fn scopes(tree: &Tree) -> ScopeIndex {
        ScopeIndex::build(tree, tree.root().expect("fixture has a root"))
    }

    fn observable_decl(tree: &mut Tree, name: &str) -> NodeId {
        let callee = tree.ident(runtime::OBSERVABLE);
        let zero = tree.number(0.0);
        let init = tree.call(callee, vec![zero]);
        tree.const_decl(name, init)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // member_chain_text
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn renders_identifiers_and_plain_chains() {
        let mut tree = Tree::new();
        let count = tree.ident("count");
        let props = tree.ident("props");
        let access = tree.member(props, "title");
        let s1 = tree.expr_stmt(count);
        let s2 = tree.expr_stmt(access);
        tree.program(vec![s1, s2]);

        let mut diagnostics = Vec::new();
        assert_eq!(
            collect::member_chain_text(&tree, count, &mut diagnostics),
            "count"
        );
        assert_eq!(
            collect::member_chain_text(&tree, access, &mut diagnostics),
            "props.title"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn renders_literal_computed_members() {
        let mut tree = Tree::new();
        let rows = tree.ident("rows");
        let index = tree.number(0.0);
        let element = tree.alloc(crate::ast::NodeKind::MemberExpression {
            object: rows,
            property: index,
            computed: true,
        });
        let chained = tree.member(element, "label");
        let stmt = tree.expr_stmt(chained);
        tree.program(vec![stmt]);

        let mut diagnostics = Vec::new();
        assert_eq!(
            collect::member_chain_text(&tree, chained, &mut diagnostics),
            "rows[0].label"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn unknown_shape_degrades_with_diagnostic() {
        let mut tree = Tree::new();
        let callee = tree.ident("get");
        let call = tree.call(callee, vec![]);
        let access = tree.member(call, "field");
        let stmt = tree.expr_stmt(access);
        tree.program(vec![stmt]);

        let mut diagnostics = Vec::new();
        assert_eq!(
            collect::member_chain_text(&tree, access, &mut diagnostics),
            ""
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ERR_MEMBER_SHAPE);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DepSet
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn dep_set_dedups_and_sorts() {
        let mut set = DepSet::default();
        set.insert("count".to_string(), NodeId(1));
        set.insert("alpha".to_string(), NodeId(2));
        set.insert("count".to_string(), NodeId(3));
        set.insert(String::new(), NodeId(4)); // degraded keys are dropped
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_sorted(), vec![NodeId(2), NodeId(3)]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // find_nested_observables
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn collects_reads_in_source_order() {
        let mut tree = Tree::new();
        let a_decl = observable_decl(&mut tree, "a");
        let b_decl = observable_decl(&mut tree, "b");
        let a_use = tree.ident("a");
        let b_use = tree.ident("b");
        let sum = tree.binary("+", a_use, b_use);
        let stmt = tree.expr_stmt(sum);
        tree.program(vec![a_decl, b_decl, stmt]);

        let scopes = scopes(&tree);
        assert_eq!(
            collect::find_nested_observables(&tree, &scopes, sum),
            vec![a_use, b_use]
        );
    }

    #[test]
    fn nested_compute_is_a_boundary() {
        let mut tree = Tree::new();
        let a_decl = observable_decl(&mut tree, "a");
        let b_decl = observable_decl(&mut tree, "b");
        let a_use = tree.ident("a");
        let inner_callee = tree.ident(runtime::COMPUTE);
        let b_use = tree.ident("b");
        let inner_thunk = tree.arrow(vec![], b_use);
        let inner = tree.call(inner_callee, vec![inner_thunk]);
        let sum = tree.binary("+", a_use, inner);
        let outer_callee = tree.ident(runtime::EFFECT);
        let outer_thunk = tree.arrow(vec![], sum);
        let outer = tree.call(outer_callee, vec![outer_thunk]);
        let stmt = tree.expr_stmt(outer);
        tree.program(vec![a_decl, b_decl, stmt]);

        let scopes = scopes(&tree);
        // Search rooted at the outer effect call sees `a` but not `b`.
        assert_eq!(
            collect::find_nested_observables(&tree, &scopes, outer),
            vec![a_use]
        );
        // Rooted at the inner compute call itself, `b` is in scope of the search.
        assert_eq!(
            collect::find_nested_observables(&tree, &scopes, inner),
            vec![b_use]
        );
    }

    #[test]
    fn markup_containers_are_a_boundary() {
        let mut tree = Tree::new();
        let a_decl = observable_decl(&mut tree, "a");
        let b_decl = observable_decl(&mut tree, "b");
        let a_use = tree.ident("a");
        let b_use = tree.ident("b");
        let container = tree.markup_container(b_use);
        let element = tree.markup_element("span", vec![], vec![container]);
        let pair = tree.array(vec![a_use, element]);
        let stmt = tree.expr_stmt(pair);
        tree.program(vec![a_decl, b_decl, stmt]);

        let scopes = scopes(&tree);
        assert_eq!(
            collect::find_nested_observables(&tree, &scopes, pair),
            vec![a_use]
        );
    }

    #[test]
    fn prop_reads_are_collected() {
        let mut tree = Tree::new();
        let param = tree.ident("props");
        let object = tree.ident("props");
        let access = tree.member(object, "title");
        let stmt = tree.expr_stmt(access);
        let body = tree.block(vec![stmt]);
        let component = tree.function_decl("Component_Card", vec![param], body);
        tree.program(vec![component]);

        let scopes = scopes(&tree);
        let found = collect::find_nested_observables(&tree, &scopes, body);
        assert_eq!(found.len(), 1);
        // The occurrence is the field identifier; its target is the chain.
        assert_eq!(collect::dependency_target(&tree, found[0]), access);
    }

    #[test]
    fn dependency_target_promotes_field_accesses_only() {
        let mut tree = Tree::new();
        let todo_decl = observable_decl(&mut tree, "todo");
        let todo_read = tree.ident("todo");
        let text = tree.member(todo_read, "text");
        let count_read = tree.ident("count");
        let value = tree.member(count_read, runtime::VALUE_MEMBER);
        let s1 = tree.expr_stmt(text);
        let s2 = tree.expr_stmt(value);
        tree.program(vec![todo_decl, s1, s2]);

        assert_eq!(collect::dependency_target(&tree, todo_read), text);
        assert_eq!(collect::dependency_target(&tree, count_read), count_read);
    }
}
