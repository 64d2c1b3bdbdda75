//! Capability Extraction Module
//!
//! Enumerates the named entries of the object a plugin binding returns or holds.

use crate::domain::ast::{children, key_name, unparen, Span, LITERALS};
use crate::domain::navigate::{is_function, object_literal, return_argument, returns_of};
use serde::Serialize;
use tree_sitter::Node;

/// Coarse classification of a capability's value node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Function expression or object method
    Function,
    Arrow,
    Literal,
    Other,
}

impl ValueKind {
    pub fn of(expr: Node<'_>) -> Self {
        let expr = unparen(expr);
        match expr.kind() {
            "arrow_function" => ValueKind::Arrow,
            kind if LITERALS.contains(&kind) => ValueKind::Literal,
            _ if is_function(expr) => ValueKind::Function,
            _ => ValueKind::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Function => "function",
            ValueKind::Arrow => "arrow",
            ValueKind::Literal => "literal",
            ValueKind::Other => "other",
        }
    }
}

/// One named entry on the plugin object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub name: String,
    pub value_kind: ValueKind,
    /// Exact source text of the value
    pub source_text: String,
    pub span: Span,
}

/// Capabilities in source order; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    entries: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new(entries: Vec<Capability>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, capability: Capability) {
        self.entries.push(capability);
    }

    pub fn extend(&mut self, other: CapabilitySet) {
        self.entries.extend(other.entries);
    }

    /// First capability with the given name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Capability> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = std::slice::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ComputedKey,
    Spread,
}

/// A property without a static name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProperty {
    pub reason: SkipReason,
    pub span: Span,
}

/// Result of walking one or more object literals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub capabilities: CapabilitySet,
    pub skipped: Vec<SkippedProperty>,
}

impl Extraction {
    pub fn merge(&mut self, other: Extraction) {
        self.capabilities.extend(other.capabilities);
        self.skipped.extend(other.skipped);
    }
}

/// Capabilities of every object literal returned by the function's own return statements.
pub fn extract_from_function(func: Node<'_>, source: &str) -> Extraction {
    let mut extraction = Extraction::default();
    for ret in returns_of(func) {
        if let Some(object) = return_argument(ret).and_then(object_literal) {
            extract_object(object, source, &mut extraction);
        }
    }
    extraction
}

/// Capabilities of a variable initializer; empty unless it is an object literal.
pub fn extract_from_initializer(init: Option<Node<'_>>, source: &str) -> Extraction {
    let mut extraction = Extraction::default();
    if let Some(object) = init.and_then(object_literal) {
        extract_object(object, source, &mut extraction);
    }
    extraction
}

fn extract_object(object: Node<'_>, source: &str, out: &mut Extraction) {
    for prop in children(object) {
        let (key, value_kind, span) = match prop.kind() {
            "pair" => {
                let (Some(key), Some(value)) = (prop.child_by_field_name("key"), prop.child_by_field_name("value")) else {
                    continue;
                };
                (key, ValueKind::of(value), Span::of(unparen(value)))
            }
            "method_definition" => {
                let Some(key) = prop.child_by_field_name("name") else { continue };
                let start = prop.child_by_field_name("parameters").unwrap_or(prop);
                let end = prop.child_by_field_name("body").unwrap_or(prop);
                (key, ValueKind::Function, Span::new(start.start_byte(), end.end_byte()))
            }
            "shorthand_property_identifier" => {
                let name = Span::of(prop).slice(source).to_string();
                out.capabilities.push(capability(name, ValueKind::Other, Span::of(prop), source));
                continue;
            }
            "spread_element" => {
                out.skipped.push(SkippedProperty { reason: SkipReason::Spread, span: Span::of(prop) });
                continue;
            }
            _ => continue,
        };
        match key_name(key, source) {
            Some(name) => out.capabilities.push(capability(name, value_kind, span, source)),
            None => out.skipped.push(SkippedProperty { reason: SkipReason::ComputedKey, span: Span::of(prop) }),
        }
    }
}

fn capability(name: String, value_kind: ValueKind, span: Span, source: &str) -> Capability {
    Capability { name, value_kind, source_text: span.slice(source).to_string(), span }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::navigate::{declarators, declared_function};
    use crate::domain::parser::build_tree;

    #[test]
    fn test_function_returns_in_branches() {
        let src = "function f(x) { if (x) { return { a: 1 } } else { return { b: () => 2 } } }";
        let tree = build_tree(src).unwrap();
        let extraction = extract_from_function(declared_function(tree.statements()[0]).unwrap(), src);
        assert_eq!(extraction.capabilities.names(), vec!["a", "b"]);
        assert_eq!(extraction.capabilities.get("a").unwrap().value_kind, ValueKind::Literal);
        assert_eq!(extraction.capabilities.get("b").unwrap().value_kind, ValueKind::Arrow);
    }

    #[test]
    fn test_key_forms_and_skips() {
        let src = "function f() { return ({ 'quoted': 1, 42: two, [dyn]: 3, ...base, shorthand, run(x) { go(x) } }) }";
        let tree = build_tree(src).unwrap();
        let extraction = extract_from_function(declared_function(tree.statements()[0]).unwrap(), src);
        assert_eq!(extraction.capabilities.names(), vec!["quoted", "42", "shorthand", "run"]);
        assert_eq!(extraction.skipped.len(), 2);
        assert_eq!(extraction.skipped[0].reason, SkipReason::ComputedKey);
        assert_eq!(extraction.skipped[1].reason, SkipReason::Spread);

        let run = extraction.capabilities.get("run").unwrap();
        assert_eq!(run.value_kind, ValueKind::Function);
        assert_eq!(run.source_text, "(x) { go(x) }");
        assert_eq!(extraction.capabilities.get("42").unwrap().value_kind, ValueKind::Other);
    }

    #[test]
    fn test_source_text_matches_span() {
        let src = "const p = { start: function start () { return 'é' }, n: (1) }";
        let tree = build_tree(src).unwrap();
        let declarator = declarators(tree.statements()[0])[0];
        let extraction = extract_from_initializer(declarator.child_by_field_name("value"), src);
        for cap in &extraction.capabilities {
            assert_eq!(&src[cap.span.start..cap.span.end], cap.source_text);
        }
        assert_eq!(extraction.capabilities.get("n").unwrap().source_text, "1");
    }

    #[test]
    fn test_deeply_parenthesised_value_on_small_stack() {
        let depth = 5_000;
        let src = format!("function f() {{ return {{ a: {}1{} }} }}", "(".repeat(depth), ")".repeat(depth));
        let names = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                let tree = build_tree(&src).unwrap();
                let extraction = extract_from_function(declared_function(tree.statements()[0]).unwrap(), &src);
                extraction
                    .capabilities
                    .iter()
                    .map(|c| (c.name.clone(), c.value_kind, c.source_text.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap()
            .join()
            .expect("extraction must not overflow the stack");
        assert_eq!(names, vec![("a".to_string(), ValueKind::Literal, "1".to_string())]);
    }

    #[test]
    fn test_non_object_initializer_is_empty() {
        let src = "const p = create()";
        let tree = build_tree(src).unwrap();
        let declarator = declarators(tree.statements()[0])[0];
        assert!(extract_from_initializer(declarator.child_by_field_name("value"), src).capabilities.is_empty());
        assert!(extract_from_initializer(None, src).capabilities.is_empty());
    }
}
