//! Infrastructure implementations for Plugin Scout.

pub mod concurrency;
pub mod config;
pub mod diagnostics;
pub mod doc_runner;
pub mod fs_reader;
pub mod jsdoc;
pub mod project_loader;

use crate::application::Introspector;
use crate::domain::error::IntrospectError;
use crate::ports::DocExtractor;
use config::{DocsMode, ScoutConfig};
use diagnostics::TracingSink;
use doc_runner::CommandDocExtractor;
use fs_reader::FsSourceReader;
use jsdoc::JsDocExtractor;
use std::path::PathBuf;
use std::sync::Arc;

/// Doc extractor used when doc extraction is switched off.
pub struct NoDocExtractor;

impl DocExtractor for NoDocExtractor {
    fn extract(&self, _paths: &[PathBuf]) -> Result<serde_json::Value, IntrospectError> {
        Ok(serde_json::Value::Null)
    }
}

pub fn doc_extractor_for(config: &ScoutConfig) -> Arc<dyn DocExtractor> {
    match config.docs.extractor {
        DocsMode::Builtin => Arc::new(JsDocExtractor::default()),
        DocsMode::Command => Arc::new(CommandDocExtractor::new(config.docs.program.clone(), config.docs.args.clone())),
        DocsMode::None => Arc::new(NoDocExtractor),
    }
}

/// Wire an introspector with filesystem reading and tracing diagnostics.
pub fn build_introspector(config: &ScoutConfig) -> anyhow::Result<Introspector> {
    let introspector = Introspector::new(Arc::new(FsSourceReader), doc_extractor_for(config), Arc::new(TracingSink))
        .with_export_slot(config.export_slot_path()?);
    Ok(introspector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_docs_yield_null() {
        let config = ScoutConfig {
            docs: config::DocsConfig { extractor: DocsMode::None, ..Default::default() },
            ..Default::default()
        };
        let value = doc_extractor_for(&config).extract(&[PathBuf::from("x.js")]).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_build_introspector_uses_configured_slot() {
        let config = ScoutConfig { export_slot: "exports.default".into(), ..Default::default() };
        let introspector = build_introspector(&config).unwrap();
        assert_eq!(introspector.export_slot().render(), "exports.default");
    }
}
