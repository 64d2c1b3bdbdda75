//! External Doc Extractor Runner.
//!
//! Runs a jsdoc-compatible command (default `jsdoc2md --json <files>`) and
//! parses its stdout as JSON template data.

use crate::domain::error::IntrospectError;
use crate::ports::DocExtractor;
use std::path::PathBuf;
use std::process::Command;

pub const DEFAULT_PROGRAM: &str = "jsdoc2md";

// ═══════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDocExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandDocExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

impl Default for CommandDocExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, vec!["--json".to_string()])
    }
}

impl DocExtractor for CommandDocExtractor {
    fn extract(&self, paths: &[PathBuf]) -> Result<serde_json::Value, IntrospectError> {
        let spec = build_command_spec(&self.program, &self.args, paths);
        let stdout = run_command(&spec)?;
        serde_json::from_str(&stdout).map_err(|e| {
            IntrospectError::DocExtraction(format!("{} produced invalid JSON: {}", spec.program, e))
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Internal Implementation
// ═══════════════════════════════════════════════════════════════════════════

fn run_command(spec: &DocCommandSpec) -> Result<String, IntrospectError> {
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .output()
        .map_err(|e| IntrospectError::DocExtraction(format!("{} could not be started: {}", spec.program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IntrospectError::DocExtraction(format!(
            "{} failed with exit code {:?}: {}",
            spec.program,
            output.status.code(),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ═══════════════════════════════════════════════════════════════════════════
// Testable Command Builder
// ═══════════════════════════════════════════════════════════════════════════

/// The command line that would be run for a set of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

/// Configured args first, then the files.
pub fn build_command_spec(program: &str, args: &[String], paths: &[PathBuf]) -> DocCommandSpec {
    let mut all_args = args.to_vec();
    all_args.extend(paths.iter().map(|p| p.display().to_string()));
    DocCommandSpec { program: program.to_string(), args: all_args }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_spec_default() {
        let extractor = CommandDocExtractor::default();
        let spec = build_command_spec(&extractor.program, &extractor.args, &[PathBuf::from("plugin.js")]);
        assert_eq!(spec.program, "jsdoc2md");
        assert_eq!(spec.args, vec!["--json".to_string(), "plugin.js".to_string()]);
    }

    #[test]
    fn test_missing_program_is_doc_error() {
        let extractor = CommandDocExtractor::new("plugin-scout-no-such-program", vec![]);
        let err = extractor.extract(&[PathBuf::from("plugin.js")]).unwrap_err();
        assert!(matches!(err, IntrospectError::DocExtraction(_)));
    }

    #[test]
    #[cfg(unix)]
    fn test_stdout_parsed_as_json() {
        let extractor = CommandDocExtractor::new("echo", vec![]);
        let value = extractor.extract(&[PathBuf::from("[1,2]")]).unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));
    }

    #[test]
    #[cfg(unix)]
    fn test_non_json_output_is_doc_error() {
        let extractor = CommandDocExtractor::new("echo", vec!["not json".to_string()]);
        assert!(extractor.extract(&[]).is_err());
    }
}
