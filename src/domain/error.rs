//! Introspection Errors
//!
//! Pipeline stages propagate these with `?`; only the introspection façade
//! turns them into report issues.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectError {
    /// Both grammar modes rejected the source; carries the module-mode failure.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        message: String,
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("no top-level statement assigns the primary export")]
    NoPrimaryExport,

    #[error("no function or variable declaration named `{}`", .name.as_deref().unwrap_or("<anonymous>"))]
    NoBindingFound { name: Option<String> },

    #[error("doc-comment extraction failed: {0}")]
    DocExtraction(String),

    #[error("cannot read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
}

impl IntrospectError {
    /// Build a parse error, computing the 1-based line and column of `offset` in `source`.
    pub fn parse(message: impl Into<String>, offset: usize, source: &str) -> Self {
        let offset = offset.min(source.len());
        let (line, column) = line_col(source, offset);
        IntrospectError::Parse { message: message.into(), offset, line, column }
    }

    /// Pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            IntrospectError::Read { .. } => "read",
            IntrospectError::Parse { .. } => "parse",
            IntrospectError::NoPrimaryExport => "export",
            IntrospectError::NoBindingFound { .. } => "binding",
            IntrospectError::DocExtraction(_) => "docs",
        }
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset.min(source.len())).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_position() {
        let src = "let a = 1;\nlet b = {;\n";
        let err = IntrospectError::parse("Unexpected token", 20, src);
        match err {
            IntrospectError::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 10);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_display_messages() {
        let err = IntrospectError::NoBindingFound { name: Some("build".into()) };
        assert_eq!(err.to_string(), "no function or variable declaration named `build`");
        let err = IntrospectError::NoBindingFound { name: None };
        assert!(err.to_string().contains("<anonymous>"));
        assert_eq!(IntrospectError::NoPrimaryExport.stage(), "export");
    }
}
