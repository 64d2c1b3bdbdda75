//! Report Exporters
//!
//! Render finished reports as JSON (one array of report DTOs) or as plain text.

use crate::api::dto::ReportDto;
use crate::domain::report::IntrospectionReport;
use crate::ports::ReportExporter;
use anyhow::{bail, Result};
use std::io::Write;

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(&self, reports: &[IntrospectionReport], out: &mut dyn Write) -> Result<()> {
        let dtos: Vec<ReportDto> = reports.iter().map(ReportDto::from).collect();
        serde_json::to_writer_pretty(&mut *out, &dtos)?;
        writeln!(out)?;
        Ok(())
    }
}

pub struct TextExporter;

impl TextExporter {
    pub fn to_text(report: &IntrospectionReport) -> String {
        let mut lines = vec![report.path.display().to_string()];
        if let Some(tree) = &report.tree {
            lines.push(format!("  mode: {} ({} statements)", tree.mode, tree.statement_count()));
        }
        if let Some(export) = &report.export {
            lines.push(format!("  export: {}", export.rendered_statement));
        }
        if let Some(capabilities) = &report.capabilities {
            lines.push(format!("  capabilities ({}):", capabilities.len()));
            for cap in capabilities {
                let first_line = cap.source_text.lines().next().unwrap_or("");
                lines.push(format!("    - {} [{}] {}", cap.name, cap.value_kind.name(), first_line));
            }
        }
        if let Some(docs) = report.doc_comments.as_ref().and_then(|d| d.as_array()) {
            lines.push(format!("  doclets: {}", docs.len()));
        }
        for issue in &report.issues {
            lines.push(format!("  ! {}: {}", issue.stage, issue.message));
        }
        lines.join("\n")
    }
}

impl ReportExporter for TextExporter {
    fn export(&self, reports: &[IntrospectionReport], out: &mut dyn Write) -> Result<()> {
        for report in reports {
            writeln!(out, "{}", Self::to_text(report))?;
        }
        Ok(())
    }
}

/// Exporter for a `--format` value.
pub fn exporter_for(format: &str) -> Result<Box<dyn ReportExporter>> {
    match format {
        "json" => Ok(Box::new(JsonExporter)),
        "text" => Ok(Box::new(TextExporter)),
        other => bail!("Unknown output format: {} (expected json or text)", other),
    }
}
