use crate::domain::report::IntrospectionReport;
use serde::{Deserialize, Serialize};

/// Serialized name of a unit enum variant.
fn variant_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::new(),
    }
}

/// Serializable view of an introspection report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDto {
    pub path: String,
    pub tree: Option<TreeSummaryDto>,
    pub export: Option<ExportDto>,
    pub binding_kind: Option<String>,
    pub capabilities: Option<Vec<CapabilityDto>>,
    pub doc_comments: Option<serde_json::Value>,
    pub issues: Vec<IssueDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummaryDto {
    pub mode: String,
    pub statements: usize,
    pub comments: usize,
    pub source_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDto {
    pub is_primary: bool,
    pub exported_name: Option<String>,
    pub rendered_statement: String,
    pub form: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDto {
    pub name: String,
    pub value_kind: String,
    pub source_text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDto {
    pub stage: String,
    pub message: String,
}

impl From<&IntrospectionReport> for ReportDto {
    fn from(report: &IntrospectionReport) -> Self {
        let tree = report.tree.as_ref().map(|t| TreeSummaryDto {
            mode: t.mode.to_string(),
            statements: t.statement_count(),
            comments: t.comments().len(),
            source_len: t.source_len(),
        });
        let export = report.export.as_ref().map(|e| ExportDto {
            is_primary: e.is_primary,
            exported_name: e.exported_name.clone(),
            rendered_statement: e.rendered_statement.clone(),
            form: variant_name(&e.form),
            start: e.span.start,
            end: e.span.end,
        });
        let capabilities = report.capabilities.as_ref().map(|set| {
            set.iter()
                .map(|c| CapabilityDto {
                    name: c.name.clone(),
                    value_kind: c.value_kind.name().to_string(),
                    source_text: c.source_text.clone(),
                    start: c.span.start,
                    end: c.span.end,
                })
                .collect()
        });
        ReportDto {
            path: report.path.display().to_string(),
            tree,
            export,
            binding_kind: report.binding_kind.as_ref().map(variant_name),
            capabilities,
            doc_comments: report.doc_comments.clone(),
            issues: report
                .issues
                .iter()
                .map(|i| IssueDto { stage: i.stage.clone(), message: i.message.clone() })
                .collect(),
        }
    }
}
