//! JavaScript Parser
//!
//! Wraps the tree-sitter JavaScript grammar. The source is parsed once; the
//! resulting tree is then checked against each grammar mode in fallback order,
//! standalone script first and module second.

use crate::domain::ast::{is_scope_boundary, unparen, Span, SyntaxTree};
use crate::domain::error::IntrospectError;
use crate::domain::language::GrammarMode;
use tree_sitter::{Node, Parser, Tree};

/// Longest snippet quoted in an "Unexpected" message.
const SNIPPET_LEN: usize = 24;

const ASSIGNMENT_TARGETS: &[&str] = &[
    "identifier", "member_expression", "subscript_expression", "object_pattern", "array_pattern", "undefined",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    fn at(node: Node<'_>, message: impl Into<String>) -> Self {
        SyntaxError { message: message.into(), offset: node.start_byte() }
    }
}

/// Build a syntax tree: script grammar first, module grammar on any failure.
/// When both fail, the module-mode failure is reported.
pub fn build_tree(source: &str) -> Result<SyntaxTree, IntrospectError> {
    let to_error = |err: SyntaxError| IntrospectError::parse(err.message, err.offset, source);
    let tree = parse_source(source).map_err(to_error)?;
    let [first, second] = GrammarMode::FALLBACK_ORDER;
    let mode = match check_mode(&tree, source, first) {
        Ok(()) => first,
        Err(_) => {
            check_mode(&tree, source, second).map_err(to_error)?;
            second
        }
    };
    Ok(SyntaxTree::new(mode, tree, source))
}

/// Parse under a single grammar mode.
pub fn parse_with_mode(source: &str, mode: GrammarMode) -> Result<SyntaxTree, SyntaxError> {
    let tree = parse_source(source)?;
    check_mode(&tree, source, mode)?;
    Ok(SyntaxTree::new(mode, tree, source))
}

fn parse_source(source: &str) -> Result<Tree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .map_err(|err| SyntaxError { message: format!("JavaScript grammar unavailable: {}", err), offset: 0 })?;
    parser
        .parse(source, None)
        .ok_or_else(|| SyntaxError { message: "parser produced no tree".to_string(), offset: 0 })
}

/// Walk the whole tree once, rejecting recovered syntax errors and the forms
/// `mode` does not allow.
fn check_mode(tree: &Tree, source: &str, mode: GrammarMode) -> Result<(), SyntaxError> {
    // (node, inside a function body, direct child of the program)
    let mut stack: Vec<(Node<'_>, bool, bool)> = vec![(tree.root_node(), false, false)];
    while let Some((node, in_function, top_level)) = stack.pop() {
        if node.is_error() {
            return Err(SyntaxError::at(node, unexpected(node, source)));
        }
        if node.is_missing() {
            return Err(SyntaxError::at(node, format!("Expected `{}`", node.kind())));
        }
        check_node(node, source, mode, in_function, top_level)?;

        let is_root = node.kind() == "program";
        let in_function = in_function || (is_scope_boundary(node.kind()) && !node.kind().starts_with("class"));
        let mut cursor = node.walk();
        let kids: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(kids.into_iter().rev().map(|kid| (kid, in_function, is_root)));
    }
    Ok(())
}

fn check_node(node: Node<'_>, source: &str, mode: GrammarMode, in_function: bool, top_level: bool) -> Result<(), SyntaxError> {
    match node.kind() {
        "import_statement" | "export_statement" => {
            if !mode.allows_module_declarations() {
                return Err(SyntaxError::at(node, "`import` and `export` may only appear with sourceType: module"));
            }
            if !top_level {
                return Err(SyntaxError::at(node, "`import` and `export` may only appear at the top level"));
            }
        }
        "meta_property" | "member_expression" if is_import_meta(node, source) && !mode.allows_module_declarations() => {
            return Err(SyntaxError::at(node, "Cannot use `import.meta` outside a module"));
        }
        "with_statement" if mode.is_strict() => {
            return Err(SyntaxError::at(node, "`with` in strict mode"));
        }
        "await_expression" if !in_function && !mode.allows_top_level_await() => {
            return Err(SyntaxError::at(node, "Cannot use keyword `await` outside an async function"));
        }
        "return_statement" if !in_function => {
            return Err(SyntaxError::at(node, "`return` outside of function"));
        }
        "assignment_expression" | "augmented_assignment_expression" => {
            if let Some(left) = node.child_by_field_name("left") {
                if !ASSIGNMENT_TARGETS.contains(&unparen(left).kind()) {
                    return Err(SyntaxError::at(left, "Assigning to rvalue"));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// `import.meta`, whichever node shape the grammar gives it.
fn is_import_meta(node: Node<'_>, source: &str) -> bool {
    match node.kind() {
        "meta_property" => Span::of(node).slice(source).starts_with("import"),
        _ => node
            .child_by_field_name("object")
            .is_some_and(|object| object.kind() == "import"),
    }
}

fn unexpected(node: Node<'_>, source: &str) -> String {
    let text = Span::of(node).slice(source).trim_start();
    let line = text.lines().next().unwrap_or("");
    if line.is_empty() {
        return "Unexpected end of input".to_string();
    }
    let snippet: String = line.chars().take(SNIPPET_LEN).collect();
    format!("Unexpected `{}`", snippet)
}
