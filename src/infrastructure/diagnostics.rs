//! Diagnostic sinks: tracing for real runs, an in-memory buffer for tests.

use crate::ports::{DiagnosticSink, Severity};
use std::sync::Mutex;

/// Forwards diagnostics to `tracing` under the `plugin_scout` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(target: "plugin_scout", "{}", message),
            Severity::Info => tracing::info!(target: "plugin_scout", "{}", message),
            Severity::Warn => tracing::warn!(target: "plugin_scout", "{}", message),
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, m)| m).collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries().iter().filter(|(s, _)| *s == severity).count()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, severity: Severity, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((severity, message.to_string()));
        }
    }
}
