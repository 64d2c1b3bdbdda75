//! Ports: the collaborators the introspection core talks to.

pub mod report_exporter;

use crate::domain::error::IntrospectError;
use crate::domain::report::IntrospectionReport;
use std::path::{Path, PathBuf};

/// Reads plugin source text from storage.
pub trait SourceReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<String, IntrospectError>;
}

/// Extracts structured doc-comment data; the result is treated as opaque.
pub trait DocExtractor: Send + Sync {
    fn extract(&self, paths: &[PathBuf]) -> Result<serde_json::Value, IntrospectError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// Diagnostic output channel.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, severity: Severity, message: &str);

    fn debug(&self, message: &str) {
        self.emit(Severity::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Severity::Warn, message);
    }
}

/// Writes finished reports somewhere.
pub trait ReportExporter {
    fn export(&self, reports: &[IntrospectionReport], out: &mut dyn std::io::Write) -> anyhow::Result<()>;
}
