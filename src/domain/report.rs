//! Introspection Report
//!
//! Aggregate returned by the façade. Each stage fills its field or records an issue.

use crate::domain::ast::SyntaxTree;
use crate::domain::binding::BindingKind;
use crate::domain::capability::CapabilitySet;
use crate::domain::error::IntrospectError;
use crate::domain::exports::ExportDescriptor;
use serde::Serialize;
use std::path::PathBuf;

/// A stage that failed while building a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportIssue {
    pub stage: String,
    pub message: String,
}

impl From<&IntrospectError> for ReportIssue {
    fn from(err: &IntrospectError) -> Self {
        ReportIssue { stage: err.stage().to_string(), message: err.to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct IntrospectionReport {
    pub path: PathBuf,
    pub tree: Option<SyntaxTree>,
    pub export: Option<ExportDescriptor>,
    pub binding_kind: Option<BindingKind>,
    pub capabilities: Option<CapabilitySet>,
    /// Opaque doc-comment data from the doc extractor
    pub doc_comments: Option<serde_json::Value>,
    pub issues: Vec<ReportIssue>,
}

impl IntrospectionReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tree: None,
            export: None,
            binding_kind: None,
            capabilities: None,
            doc_comments: None,
            issues: Vec::new(),
        }
    }

    pub fn record(&mut self, err: &IntrospectError) {
        self.issues.push(ReportIssue::from(err));
    }

    /// True when every stage succeeded.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue recorded for a stage, if any.
    pub fn issue(&self, stage: &str) -> Option<&ReportIssue> {
        self.issues.iter().find(|i| i.stage == stage)
    }

    pub fn capability_names(&self) -> Vec<&str> {
        self.capabilities.as_ref().map(|c| c.names()).unwrap_or_default()
    }
}
