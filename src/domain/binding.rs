//! Binding Resolution Module
//!
//! Locates the declaration behind the primary export's name. Strategies run
//! in order; the first one that yields capabilities wins.

use crate::domain::ast::{text, Span};
use crate::domain::capability::{extract_from_function, extract_from_initializer, Extraction};
use crate::domain::error::IntrospectError;
use crate::domain::exports::{ExportDescriptor, ExportForm};
use crate::domain::navigate::{declarators, declared_function, function_name, is_default_export};
use serde::Serialize;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Function,
    Variable,
}

/// The declaration a primary export resolved to, with what it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub name: Option<String>,
    pub kind: BindingKind,
    /// Span of the first matching declaration
    pub span: Span,
    pub extraction: Extraction,
}

impl ResolvedBinding {
    pub fn has_capabilities(&self) -> bool {
        !self.extraction.capabilities.is_empty()
    }
}

/// One way of finding a binding among top-level statements.
pub trait BindingStrategy: Send + Sync {
    fn kind(&self) -> BindingKind;

    /// `None` when no declaration matches.
    fn resolve(&self, statements: &[Node<'_>], primary: &ExportDescriptor, source: &str) -> Option<ResolvedBinding>;
}

/// Top-level function declarations and default-exported functions.
pub struct FunctionDeclarationStrategy;

impl FunctionDeclarationStrategy {
    fn matches(stmt: Node<'_>, func: Node<'_>, primary: &ExportDescriptor, source: &str) -> bool {
        match (function_name(func, source), primary.exported_name.as_deref()) {
            (Some(name), Some(wanted)) => name == wanted,
            // anonymous default export, matched by the very statement it came from
            (None, None) => {
                primary.form == ExportForm::DefaultExport
                    && is_default_export(stmt)
                    && Span::of(stmt) == primary.span
            }
            _ => false,
        }
    }
}

impl BindingStrategy for FunctionDeclarationStrategy {
    fn kind(&self) -> BindingKind {
        BindingKind::Function
    }

    fn resolve(&self, statements: &[Node<'_>], primary: &ExportDescriptor, source: &str) -> Option<ResolvedBinding> {
        let mut found: Option<ResolvedBinding> = None;
        for &stmt in statements {
            let Some(func) = declared_function(stmt) else { continue };
            if !Self::matches(stmt, func, primary, source) {
                continue;
            }
            let extraction = extract_from_function(func, source);
            match found.as_mut() {
                Some(binding) => binding.extraction.merge(extraction),
                None => {
                    found = Some(ResolvedBinding {
                        name: primary.exported_name.clone(),
                        kind: BindingKind::Function,
                        span: Span::of(func),
                        extraction,
                    })
                }
            }
        }
        found
    }
}

/// Declarators of top-level `var`/`let`/`const` statements.
pub struct VariableDeclarationStrategy;

impl BindingStrategy for VariableDeclarationStrategy {
    fn kind(&self) -> BindingKind {
        BindingKind::Variable
    }

    fn resolve(&self, statements: &[Node<'_>], primary: &ExportDescriptor, source: &str) -> Option<ResolvedBinding> {
        let wanted = primary.exported_name.as_deref()?;
        let mut found: Option<ResolvedBinding> = None;
        let matching = statements
            .iter()
            .flat_map(|&stmt| declarators(stmt))
            .filter(|d| {
                d.child_by_field_name("name")
                    .is_some_and(|id| id.kind() == "identifier" && text(id, source) == wanted)
            });
        for declarator in matching {
            let extraction = extract_from_initializer(declarator.child_by_field_name("value"), source);
            match found.as_mut() {
                Some(binding) => binding.extraction.merge(extraction),
                None => {
                    found = Some(ResolvedBinding {
                        name: Some(wanted.to_string()),
                        kind: BindingKind::Variable,
                        span: Span::of(declarator),
                        extraction,
                    })
                }
            }
        }
        found
    }
}

/// Function search first, variable search as fallback.
pub const DEFAULT_STRATEGIES: [&dyn BindingStrategy; 2] = [&FunctionDeclarationStrategy, &VariableDeclarationStrategy];

/// Resolve the primary export with the default strategies.
pub fn resolve_binding(statements: &[Node<'_>], primary: &ExportDescriptor, source: &str) -> Result<ResolvedBinding, IntrospectError> {
    resolve_binding_with(&DEFAULT_STRATEGIES, statements, primary, source)
}

/// Run `strategies` in order. The first binding with capabilities wins; otherwise the
/// first matching declaration is returned with none.
pub fn resolve_binding_with(
    strategies: &[&dyn BindingStrategy],
    statements: &[Node<'_>],
    primary: &ExportDescriptor,
    source: &str,
) -> Result<ResolvedBinding, IntrospectError> {
    let mut first_match = None;
    for strategy in strategies {
        let Some(binding) = strategy.resolve(statements, primary, source) else { continue };
        if binding.has_capabilities() {
            return Ok(binding);
        }
        first_match.get_or_insert(binding);
    }
    first_match.ok_or_else(|| IntrospectError::NoBindingFound { name: primary.exported_name.clone() })
}
