//! Syntax Tree
//!
//! A parsed plugin source: the tree-sitter concrete syntax tree plus the text
//! it was built from. Engine stages match on node kinds and slice the source
//! through byte spans; nothing here recurses, so tree depth never grows the stack.

use crate::domain::language::GrammarMode;
use serde::Serialize;
use tree_sitter::{Node, Tree};

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn of(node: Node<'_>) -> Self {
        Self { start: node.start_byte(), end: node.end_byte() }
    }

    /// Slice the original text covered by this span.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Grammar mode that accepted the source
    pub mode: GrammarMode,
    tree: Tree,
    source: String,
}

impl SyntaxTree {
    pub(crate) fn new(mode: GrammarMode, tree: Tree, source: &str) -> Self {
        Self { mode, tree, source: source.to_string() }
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Length of the source in bytes.
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Top-level statements in source order.
    pub fn statements(&self) -> Vec<Node<'_>> {
        children(self.root())
            .into_iter()
            .filter(|n| n.kind() != "hash_bang_line")
            .collect()
    }

    pub fn statement_count(&self) -> usize {
        self.statements().len()
    }

    /// Comments in source order.
    pub fn comments(&self) -> Vec<Comment> {
        let mut comments = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if node.kind() == "comment" {
                comments.push(Comment::from_node(node, &self.source));
                continue;
            }
            let mut cursor = node.walk();
            let kids: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            stack.extend(kids.into_iter().rev());
        }
        comments
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Text between the delimiters
    pub text: String,
    pub span: Span,
}

impl Comment {
    fn from_node(node: Node<'_>, source: &str) -> Self {
        let span = Span::of(node);
        let raw = span.slice(source);
        let (kind, text) = match raw.strip_prefix("//") {
            Some(line) => (CommentKind::Line, line),
            None => {
                let inner = raw.strip_prefix("/*").unwrap_or(raw);
                (CommentKind::Block, inner.strip_suffix("*/").unwrap_or(inner))
            }
        };
        Comment { kind, text: text.to_string(), span }
    }

    /// `/** ... */` blocks (but not `/**/`).
    pub fn is_doc_block(&self) -> bool {
        self.kind == CommentKind::Block && self.text.starts_with('*') && !self.text.starts_with("**")
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Node helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Function expressions (`function_expression` is spelled `function` by older grammars).
pub const FUNCTION_EXPRESSIONS: &[&str] = &["function_expression", "function", "generator_function"];

pub const FUNCTION_DECLARATIONS: &[&str] = &["function_declaration", "generator_function_declaration"];

pub const LITERALS: &[&str] = &["string", "number", "true", "false", "null", "regex"];

/// Nodes that open a new function or class scope.
pub fn is_scope_boundary(kind: &str) -> bool {
    FUNCTION_EXPRESSIONS.contains(&kind)
        || FUNCTION_DECLARATIONS.contains(&kind)
        || matches!(kind, "arrow_function" | "method_definition" | "class" | "class_declaration")
}

/// Named children without comments.
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let kids = node.named_children(&mut cursor).filter(|n| n.kind() != "comment").collect();
    kids
}

pub fn first_child(node: Node<'_>) -> Option<Node<'_>> {
    children(node).into_iter().next()
}

/// Whether `node` has an anonymous token child such as `async` or `default`.
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token);
    found
}

/// Look through any number of parentheses.
pub fn unparen(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match first_child(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    Span::of(node).slice(source)
}

/// Cooked value of a `string` node.
pub fn string_value(node: Node<'_>, source: &str) -> String {
    let mut value = String::new();
    let mut cursor = node.walk();
    for part in node.named_children(&mut cursor) {
        match part.kind() {
            "string_fragment" => value.push_str(text(part, source)),
            "escape_sequence" => unescape(text(part, source), &mut value),
            _ => {}
        }
    }
    value
}

fn unescape(escape: &str, out: &mut String) {
    let body = escape.strip_prefix('\\').unwrap_or(escape);
    let mut chars = body.chars();
    let Some(first) = chars.next() else { return };
    let simple = match first {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '0' if body.len() == 1 => Some('\0'),
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => return,
        _ => None,
    };
    if let Some(c) = simple {
        out.push(c);
        return;
    }
    let hex = match first {
        'x' => Some(&body[1..]),
        'u' => Some(body[1..].trim_start_matches('{').trim_end_matches('}')),
        _ => None,
    };
    match hex.and_then(|h| u32::from_str_radix(h, 16).ok()).and_then(char::from_u32) {
        Some(c) => out.push(c),
        None if hex.is_some() => out.push_str(escape),
        None => out.push_str(body),
    }
}

/// Canonical property name of a numeric key (`0x10` names property `16`).
fn numeric_key(raw: &str) -> String {
    let digits = raw.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|rest| (rest.to_string(), radix)));
    let parsed = match radix {
        Some((rest, radix)) => u64::from_str_radix(&rest, radix).ok().map(|v| v as f64),
        None => lower.parse::<f64>().ok(),
    };
    match parsed {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e21 => format!("{}", v as i128),
        Some(v) => v.to_string(),
        None => raw.to_string(),
    }
}

/// Static name of a property key; `None` for computed keys.
pub fn key_name(key: Node<'_>, source: &str) -> Option<String> {
    match key.kind() {
        "property_identifier" | "identifier" | "private_property_identifier" => Some(text(key, source).to_string()),
        "string" => Some(string_value(key, source)),
        "number" => Some(numeric_key(text(key, source))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parser::build_tree;

    #[test]
    fn test_span_slice() {
        let src = "module.exports = build";
        assert_eq!(Span::new(17, 22).slice(src), "build");
        assert_eq!(Span::new(17, 99).slice(src), "");
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn test_statements_and_comments() {
        let src = "#!/usr/bin/env node\n// lead\n/** doc */\nfunction f() { /* inner */ }\nf()\n";
        let tree = build_tree(src).unwrap();
        let kinds: Vec<&str> = tree.statements().iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec!["function_declaration", "expression_statement"]);

        let comments = tree.comments();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].kind, CommentKind::Line);
        assert_eq!(comments[0].text, " lead");
        assert!(comments[1].is_doc_block());
        assert_eq!(comments[1].text, "* doc ");
        assert!(!comments[2].is_doc_block());
    }

    #[test]
    fn test_unparen_and_string_value() {
        let src = "x = ((('a\\tb\\u0041\\x42')))";
        let tree = build_tree(src).unwrap();
        let stmt = tree.statements()[0];
        let assign = first_child(stmt).unwrap();
        let right = unparen(assign.child_by_field_name("right").unwrap());
        assert_eq!(right.kind(), "string");
        assert_eq!(string_value(right, src), "a\tbAB");
    }

    #[test]
    fn test_numeric_keys() {
        assert_eq!(numeric_key("42"), "42");
        assert_eq!(numeric_key("0x10"), "16");
        assert_eq!(numeric_key("1_000"), "1000");
        assert_eq!(numeric_key("1.5"), "1.5");
    }
}
