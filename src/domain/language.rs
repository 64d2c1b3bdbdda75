//! Grammar Mode Module
//!
//! Defines the grammar modes Plugin Scout can parse a plugin source under.

use serde::Serialize;

/// Parser configuration variant governing which top-level forms are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarMode {
    /// Standalone script: CommonJS style, `import`/`export` declarations rejected.
    Script,
    /// ES module: strict, import/export declarations and top-level await allowed.
    Module,
}

impl GrammarMode {
    /// The order in which the syntax tree builder attempts each mode.
    pub const FALLBACK_ORDER: [GrammarMode; 2] = [GrammarMode::Script, GrammarMode::Module];

    /// Get the display name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            GrammarMode::Script => "script",
            GrammarMode::Module => "module",
        }
    }

    /// Whether `import` / `export` declarations may appear at top level.
    pub fn allows_module_declarations(&self) -> bool {
        matches!(self, GrammarMode::Module)
    }

    /// Module code is always strict mode code.
    pub fn is_strict(&self) -> bool {
        matches!(self, GrammarMode::Module)
    }

    /// Whether `await` is an operator outside of async functions.
    pub fn allows_top_level_await(&self) -> bool {
        matches!(self, GrammarMode::Module)
    }
}

impl Default for GrammarMode {
    fn default() -> Self {
        GrammarMode::Script
    }
}

impl std::fmt::Display for GrammarMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
