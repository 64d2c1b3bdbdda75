//! Application layer: the introspection use case.

use crate::domain::binding::resolve_binding;
use crate::domain::error::{line_col, IntrospectError};
use crate::domain::exports::{primary_export, resolve_exports, MemberPath};
use crate::domain::parser::build_tree;
use crate::domain::report::IntrospectionReport;
use crate::ports::{DiagnosticSink, DocExtractor, SourceReader};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Façade wiring the engine stages to the injected collaborators.
///
/// Holds no per-call state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct Introspector {
    reader: Arc<dyn SourceReader>,
    docs: Arc<dyn DocExtractor>,
    sink: Arc<dyn DiagnosticSink>,
    export_slot: MemberPath,
}

impl Introspector {
    pub fn new(reader: Arc<dyn SourceReader>, docs: Arc<dyn DocExtractor>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { reader, docs, sink, export_slot: MemberPath::default() }
    }

    /// Replace the canonical export slot (`module.exports` by default).
    pub fn with_export_slot(mut self, export_slot: MemberPath) -> Self {
        self.export_slot = export_slot;
        self
    }

    pub fn export_slot(&self) -> &MemberPath {
        &self.export_slot
    }

    /// Read `path`, run the pipeline and attach doc-comment data.
    pub fn introspect(&self, path: &Path) -> IntrospectionReport {
        let mut report = IntrospectionReport::new(path);
        match self.reader.read(path) {
            Ok(text) => self.run_pipeline(&text, &mut report),
            Err(err) => self.fail(&mut report, &err),
        }
        self.attach_docs(path, &mut report);
        report
    }

    /// Same as [`Introspector::introspect`] for text the caller already holds.
    pub fn introspect_source(&self, path: &Path, text: &str) -> IntrospectionReport {
        let mut report = IntrospectionReport::new(path);
        self.run_pipeline(text, &mut report);
        self.attach_docs(path, &mut report);
        report
    }

    /// Introspect several files on the rayon pool; reports keep input order.
    pub fn introspect_many(&self, paths: &[PathBuf]) -> Vec<IntrospectionReport> {
        paths.par_iter().map(|path| self.introspect(path)).collect()
    }

    fn run_pipeline(&self, text: &str, report: &mut IntrospectionReport) {
        let tree = match build_tree(text) {
            Ok(tree) => tree,
            Err(err) => return self.fail(report, &err),
        };
        self.sink.debug(&format!(
            "{}: parsed as {} ({} statements, {} comments)",
            report.path.display(),
            tree.mode,
            tree.statement_count(),
            tree.comments().len()
        ));

        let statements = tree.statements();
        let descriptors = resolve_exports(&statements, text, &self.export_slot);
        let primaries = descriptors.iter().filter(|d| d.is_primary).count();
        if primaries > 1 {
            self.sink.warn(&format!(
                "{}: {} primary exports, using the first",
                report.path.display(),
                primaries
            ));
        }

        let outcome = primary_export(&descriptors).and_then(|primary| {
            report.export = Some(primary.clone());
            resolve_binding(&statements, primary, text)
        });
        match outcome {
            Ok(binding) => {
                for skipped in &binding.extraction.skipped {
                    let (line, column) = line_col(text, skipped.span.start);
                    self.sink.info(&format!(
                        "{}:{}:{}: skipped property without a static name ({:?})",
                        report.path.display(),
                        line,
                        column,
                        skipped.reason
                    ));
                }
                self.sink.debug(&format!(
                    "{}: {} capabilities from {:?} binding",
                    report.path.display(),
                    binding.extraction.capabilities.len(),
                    binding.kind
                ));
                report.binding_kind = Some(binding.kind);
                report.capabilities = Some(binding.extraction.capabilities);
            }
            Err(err) => self.fail(report, &err),
        }
        report.tree = Some(tree);
    }

    fn attach_docs(&self, path: &Path, report: &mut IntrospectionReport) {
        match self.docs.extract(&[path.to_path_buf()]) {
            Ok(value) => report.doc_comments = Some(value),
            Err(err) => self.fail(report, &err),
        }
    }

    fn fail(&self, report: &mut IntrospectionReport, err: &IntrospectError) {
        self.sink.warn(&format!("{}: {}", report.path.display(), err));
        report.record(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::diagnostics::MemorySink;
    use crate::ports::Severity;
    use std::collections::HashMap;

    struct MapReader(HashMap<PathBuf, String>);

    impl SourceReader for MapReader {
        fn read(&self, path: &Path) -> Result<String, IntrospectError> {
            self.0.get(path).cloned().ok_or_else(|| IntrospectError::Read {
                path: path.to_path_buf(),
                message: "not found".into(),
            })
        }
    }

    struct FixedDocs(Result<serde_json::Value, IntrospectError>);

    impl DocExtractor for FixedDocs {
        fn extract(&self, _paths: &[PathBuf]) -> Result<serde_json::Value, IntrospectError> {
            self.0.clone()
        }
    }

    fn introspector(files: &[(&str, &str)], docs: Result<serde_json::Value, IntrospectError>) -> (Introspector, Arc<MemorySink>) {
        let map = files.iter().map(|(p, s)| (PathBuf::from(p), s.to_string())).collect();
        let sink = Arc::new(MemorySink::default());
        let introspector = Introspector::new(Arc::new(MapReader(map)), Arc::new(FixedDocs(docs)), sink.clone());
        (introspector, sink)
    }

    #[test]
    fn test_full_pipeline() {
        let src = "module.exports = build\nfunction build() { return { start: () => {}, stop() {} } }";
        let (scout, _) = introspector(&[("p.js", src)], Ok(serde_json::json!([])));
        let report = scout.introspect(Path::new("p.js"));
        assert!(report.is_complete(), "{:?}", report.issues);
        assert_eq!(report.capability_names(), vec!["start", "stop"]);
        assert_eq!(report.export.unwrap().exported_name.as_deref(), Some("build"));
        assert_eq!(report.doc_comments, Some(serde_json::json!([])));
    }

    #[test]
    fn test_docs_still_attached_when_read_fails() {
        let (scout, sink) = introspector(&[], Ok(serde_json::json!([{ "name": "x" }])));
        let report = scout.introspect(Path::new("missing.js"));
        assert!(report.tree.is_none());
        assert!(report.capabilities.is_none());
        assert!(report.doc_comments.is_some());
        assert!(report.issue("read").is_some());
        assert_eq!(sink.count(Severity::Warn), 1);
    }

    #[test]
    fn test_doc_failure_keeps_capabilities() {
        let src = "var p = { a: 1 }\nmodule.exports = p";
        let (scout, _) = introspector(&[], Err(IntrospectError::DocExtraction("boom".into())));
        let report = scout.introspect_source(Path::new("p.js"), src);
        assert_eq!(report.capability_names(), vec!["a"]);
        assert!(report.doc_comments.is_none());
        assert_eq!(report.issue("docs").unwrap().stage, "docs");
    }

    #[test]
    fn test_parse_failure_recorded() {
        let (scout, _) = introspector(&[], Ok(serde_json::Value::Null));
        let report = scout.introspect_source(Path::new("bad.js"), "function (");
        assert!(report.tree.is_none());
        assert!(report.issue("parse").is_some());
    }

    #[test]
    fn test_duplicate_primary_warns() {
        let src = "module.exports = a\nmodule.exports = b\nvar a = { x: 1 }";
        let (scout, sink) = introspector(&[], Ok(serde_json::Value::Null));
        let report = scout.introspect_source(Path::new("p.js"), src);
        assert_eq!(report.capability_names(), vec!["x"]);
        assert!(sink.messages().iter().any(|m| m.contains("2 primary exports")));
    }

    #[test]
    fn test_deep_nesting_on_worker_sized_stack() {
        let depth = 5_000;
        let src = format!(
            "module.exports = f\nfunction f() {{ return {{ a: {}1{}, b: () => 2 }} }}\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let report = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                let (scout, _) = introspector(&[], Ok(serde_json::Value::Null));
                scout.introspect_source(Path::new("deep.js"), &src)
            })
            .unwrap()
            .join()
            .expect("introspection must not overflow the stack");
        assert!(report.is_complete(), "{:?}", report.issues);
        assert_eq!(report.capability_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_deep_unbalanced_nesting_is_a_parse_issue() {
        let src = format!("module.exports = {}", "[(".repeat(2_000));
        let report = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                let (scout, _) = introspector(&[], Ok(serde_json::Value::Null));
                scout.introspect_source(Path::new("deep.js"), &src)
            })
            .unwrap()
            .join()
            .expect("introspection must not overflow the stack");
        assert!(report.issue("parse").is_some());
        assert!(report.tree.is_none());
    }

    #[test]
    fn test_introspect_many_keeps_order() {
        let (scout, _) = introspector(
            &[("a.js", "module.exports = a\nvar a = { one: 1 }"), ("b.js", "module.exports = b\nvar b = { two: 2 }")],
            Ok(serde_json::Value::Null),
        );
        let reports = scout.introspect_many(&[PathBuf::from("b.js"), PathBuf::from("a.js")]);
        assert_eq!(reports[0].capability_names(), vec!["two"]);
        assert_eq!(reports[1].capability_names(), vec!["one"]);
    }
}
