//! Configuration loaded from a TOML file (`--config scout.toml`).

use crate::domain::exports::MemberPath;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Dotted canonical export slot
    pub export_slot: String,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Batch worker count; half the cores when unset
    pub threads: Option<usize>,
    pub scan: ScanConfig,
    pub docs: DocsConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            export_slot: "module.exports".to_string(),
            log_level: "info".to_string(),
            threads: None,
            scan: ScanConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    /// Directory names never descended into, on top of `node_modules` and `.git`
    pub skip_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["js".into(), "mjs".into(), "cjs".into()],
            skip_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocsMode {
    #[default]
    Builtin,
    Command,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub extractor: DocsMode,
    pub program: String,
    pub args: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            extractor: DocsMode::Builtin,
            program: "jsdoc2md".into(),
            args: vec!["--json".into()],
        }
    }
}

impl ScoutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScoutConfig = toml::from_str(content).context("Invalid scout configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to load config {}", path.display()))
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn export_slot_path(&self) -> Result<MemberPath> {
        match MemberPath::parse(&self.export_slot) {
            Some(path) => Ok(path),
            None => bail!("Invalid export_slot `{}`", self.export_slot),
        }
    }

    fn validate(&self) -> Result<()> {
        self.export_slot_path()?;
        if self.scan.extensions.is_empty() {
            bail!("scan.extensions must not be empty");
        }
        if self.docs.extractor == DocsMode::Command && self.docs.program.trim().is_empty() {
            bail!("docs.program is required when docs.extractor = \"command\"");
        }
        Ok(())
    }
}
