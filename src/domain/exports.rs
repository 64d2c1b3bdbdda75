//! Export Resolution Module
//!
//! Scans top-level statements for export-like statements: assignments such as
//! `module.exports = build` and `export default` declarations.

use crate::domain::ast::{first_child, string_value, text, unparen, Span, LITERALS};
use crate::domain::error::IntrospectError;
use crate::domain::navigate::{function_name, ident_name, is_default_export, is_function};
use serde::Serialize;
use std::fmt;
use tree_sitter::Node;

/// Maximum number of segments in an export assignment target.
pub const MAX_PATH_DEPTH: usize = 32;

/// Structural left-hand side of an export assignment, e.g. `module.exports`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberPath {
    segments: Vec<String>,
}

impl MemberPath {
    /// Resolve an assignment target. Identifiers, `this`, dotted members and
    /// string-keyed computed members count; anything else is unresolved.
    pub fn from_node(node: Node<'_>, source: &str) -> Option<Self> {
        let mut reversed = Vec::new();
        let mut current = unparen(node);
        loop {
            if reversed.len() >= MAX_PATH_DEPTH {
                return None;
            }
            match current.kind() {
                "identifier" | "this" => {
                    reversed.push(text(current, source).to_string());
                    break;
                }
                "member_expression" => {
                    if current.child_by_field_name("optional_chain").is_some() {
                        return None;
                    }
                    let property = current.child_by_field_name("property")?;
                    if property.kind() != "property_identifier" {
                        return None;
                    }
                    reversed.push(text(property, source).to_string());
                    current = unparen(current.child_by_field_name("object")?);
                }
                "subscript_expression" => {
                    if current.child_by_field_name("optional_chain").is_some() {
                        return None;
                    }
                    let index = unparen(current.child_by_field_name("index")?);
                    if index.kind() != "string" {
                        return None;
                    }
                    reversed.push(string_value(index, source));
                    current = unparen(current.child_by_field_name("object")?);
                }
                _ => return None,
            }
        }
        reversed.reverse();
        Some(Self { segments: reversed })
    }

    /// Parse a dotted spelling such as `module.exports`.
    pub fn parse(dotted: &str) -> Option<Self> {
        let segments: Vec<String> = dotted.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) || segments.len() > MAX_PATH_DEPTH {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn render(&self) -> String {
        self.segments.join(".")
    }
}

impl Default for MemberPath {
    /// The CommonJS export slot.
    fn default() -> Self {
        Self { segments: vec!["module".into(), "exports".into()] }
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Syntactic form an export descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportForm {
    Assignment,
    DefaultExport,
}

/// One top-level export-like statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDescriptor {
    /// Assigns the canonical export slot or is an `export default`
    pub is_primary: bool,
    /// Identifier on the exported side, if statically known
    pub exported_name: Option<String>,
    /// Human-readable rendering, e.g. `module.exports = build`
    pub rendered_statement: String,
    pub form: ExportForm,
    /// Span of the whole statement
    pub span: Span,
}

/// Build a descriptor for every export-like top-level statement, in statement order.
pub fn resolve_exports(statements: &[Node<'_>], source: &str, export_slot: &MemberPath) -> Vec<ExportDescriptor> {
    statements
        .iter()
        .filter_map(|&stmt| match stmt.kind() {
            "export_statement" if is_default_export(stmt) => Some(describe_default(stmt, source)),
            "expression_statement" => describe_assignment(stmt, source, export_slot),
            _ => None,
        })
        .collect()
}

fn describe_default(stmt: Node<'_>, source: &str) -> ExportDescriptor {
    let exported = stmt
        .child_by_field_name("declaration")
        .or_else(|| stmt.child_by_field_name("value").map(unparen));
    let exported_name = exported.and_then(|node| match node.kind() {
        "class" | "class_declaration" => function_name(node, source),
        _ if is_function(node) => function_name(node, source),
        _ => ident_name(node, source),
    });
    let exported_name = exported_name.map(str::to_string);
    ExportDescriptor {
        is_primary: true,
        rendered_statement: format!("export default {}", exported_name.as_deref().unwrap_or("?")),
        exported_name,
        form: ExportForm::DefaultExport,
        span: Span::of(stmt),
    }
}

fn describe_assignment(stmt: Node<'_>, source: &str, export_slot: &MemberPath) -> Option<ExportDescriptor> {
    let expr = unparen(first_child(stmt)?);
    if expr.kind() != "assignment_expression" {
        return None;
    }
    let path = MemberPath::from_node(expr.child_by_field_name("left")?, source);
    let right = unparen(expr.child_by_field_name("right")?);
    let exported_name = match right.kind() {
        kind if LITERALS.contains(&kind) => Some(text(right, source)),
        "identifier" | "undefined" => Some(text(right, source)),
        _ if is_function(right) => function_name(right, source),
        _ => None,
    };
    let exported_name = exported_name.map(str::to_string);
    let left_text = path.as_ref().map_or_else(|| "?".to_string(), MemberPath::render);
    Some(ExportDescriptor {
        is_primary: path.as_ref() == Some(export_slot),
        rendered_statement: format!("{} = {}", left_text, exported_name.as_deref().unwrap_or("?")),
        exported_name,
        form: ExportForm::Assignment,
        span: Span::of(stmt),
    })
}

/// First primary descriptor; later primaries are ignored.
pub fn primary_export(descriptors: &[ExportDescriptor]) -> Result<&ExportDescriptor, IntrospectError> {
    descriptors
        .iter()
        .find(|d| d.is_primary)
        .ok_or(IntrospectError::NoPrimaryExport)
}
