use crate::domain::error::IntrospectError;
use crate::ports::SourceReader;
use std::fs;
use std::path::Path;

/// Reads plugin sources from the local filesystem as UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read(&self, path: &Path) -> Result<String, IntrospectError> {
        fs::read_to_string(path).map_err(|e| IntrospectError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
