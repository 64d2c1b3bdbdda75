//! Tree-navigation helpers shared by the export, binding and capability stages.

use crate::domain::ast::{children, has_token, is_scope_boundary, text, unparen, FUNCTION_DECLARATIONS, FUNCTION_EXPRESSIONS};
use tree_sitter::Node;

/// Name carried by an identifier expression.
pub fn ident_name<'s>(expr: Node<'_>, source: &'s str) -> Option<&'s str> {
    let expr = unparen(expr);
    match expr.kind() {
        "identifier" => Some(text(expr, source)),
        _ => None,
    }
}

/// `export default ...` at the top level.
pub fn is_default_export(stmt: Node<'_>) -> bool {
    stmt.kind() == "export_statement" && has_token(stmt, "default")
}

/// Function declaration or expression; the bare `function` keyword token does not count.
pub fn is_function(node: Node<'_>) -> bool {
    node.is_named() && (FUNCTION_DECLARATIONS.contains(&node.kind()) || FUNCTION_EXPRESSIONS.contains(&node.kind()))
}

/// The function a top-level statement declares, either directly or wrapped in `export default`.
pub fn declared_function(stmt: Node<'_>) -> Option<Node<'_>> {
    if FUNCTION_DECLARATIONS.contains(&stmt.kind()) {
        return Some(stmt);
    }
    if !is_default_export(stmt) {
        return None;
    }
    let inner = stmt
        .child_by_field_name("declaration")
        .or_else(|| stmt.child_by_field_name("value").map(unparen))?;
    is_function(inner).then_some(inner)
}

/// Declared name of a function or class, if it has one.
pub fn function_name<'s>(func: Node<'_>, source: &'s str) -> Option<&'s str> {
    func.child_by_field_name("name").map(|name| text(name, source))
}

/// Declarators of a top-level `var`/`let`/`const` statement.
pub fn declarators(stmt: Node<'_>) -> Vec<Node<'_>> {
    match stmt.kind() {
        "lexical_declaration" | "variable_declaration" => children(stmt)
            .into_iter()
            .filter(|n| n.kind() == "variable_declarator")
            .collect(),
        _ => Vec::new(),
    }
}

/// Object literal behind an expression, looking through parentheses.
pub fn object_literal(expr: Node<'_>) -> Option<Node<'_>> {
    let expr = unparen(expr);
    (expr.kind() == "object").then_some(expr)
}

/// Collect every return statement belonging to `func`, in source order.
///
/// Descends through blocks, branches, loops, `switch`, `try` and labels, but
/// never into nested functions, arrows or classes.
pub fn returns_of(func: Node<'_>) -> Vec<Node<'_>> {
    let Some(body) = func.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut found = Vec::new();
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        if node.kind() == "return_statement" {
            found.push(node);
            continue;
        }
        let nested = children(node).into_iter().filter(|n| !is_scope_boundary(n.kind()));
        let nested: Vec<Node<'_>> = nested.collect();
        stack.extend(nested.into_iter().rev());
    }
    found
}

/// Argument of a return statement.
pub fn return_argument(stmt: Node<'_>) -> Option<Node<'_>> {
    if stmt.kind() != "return_statement" {
        return None;
    }
    children(stmt).into_iter().next()
}
