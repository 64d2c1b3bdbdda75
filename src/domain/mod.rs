//! Core introspection engine: syntax, exports, bindings and capabilities.

pub mod ast;
pub mod binding;
pub mod capability;
pub mod error;
pub mod exports;
pub mod language;
pub mod navigate;
pub mod parser;
pub mod report;
