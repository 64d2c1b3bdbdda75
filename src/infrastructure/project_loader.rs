use crate::infrastructure::config::ScanConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directories never scanned for plugins.
const ALWAYS_SKIPPED: &[&str] = &["node_modules", ".git"];

pub struct ProjectLoader;

impl ProjectLoader {
    /// Recursively collect plugin files under `root` by extension.
    /// Returns sorted paths; a file path given as `root` is returned as-is when it matches.
    pub fn collect_plugins(root: &Path, scan: &ScanConfig) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        Self::collect_recursive(root, scan, &mut files)?;
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn is_skipped(dir: &Path, scan: &ScanConfig) -> bool {
        dir.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| ALWAYS_SKIPPED.contains(&name) || scan.skip_dirs.iter().any(|s| s == name))
    }

    fn has_plugin_extension(path: &Path, scan: &ScanConfig) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| scan.extensions.iter().any(|e| e.trim_start_matches('.') == ext))
    }

    fn collect_recursive(dir: &Path, scan: &ScanConfig, out: &mut Vec<PathBuf>) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }

        if dir.is_file() {
            if Self::has_plugin_extension(dir, scan) {
                out.push(dir.to_path_buf());
            }
            return Ok(());
        }

        if Self::is_skipped(dir, scan) {
            return Ok(());
        }

        let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
            let path = entry.path();
            if path.is_dir() {
                Self::collect_recursive(&path, scan, out)?;
            } else if Self::has_plugin_extension(&path, scan) {
                out.push(path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_by_extension_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("node_modules/dep")).unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("src/a.js"), "").unwrap();
        fs::write(root.join("src/nested/b.mjs"), "").unwrap();
        fs::write(root.join("src/c.ts"), "").unwrap();
        fs::write(root.join("node_modules/dep/index.js"), "").unwrap();
        fs::write(root.join("dist/bundle.cjs"), "").unwrap();

        let scan = ScanConfig { skip_dirs: vec!["dist".into()], ..ScanConfig::default() };
        let files = ProjectLoader::collect_plugins(root, &scan).unwrap();
        assert_eq!(files, vec![root.join("src/a.js"), root.join("src/nested/b.mjs")]);
    }

    #[test]
    fn test_single_file_and_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plugin.cjs");
        fs::write(&file, "").unwrap();
        let scan = ScanConfig::default();
        assert_eq!(ProjectLoader::collect_plugins(&file, &scan).unwrap(), vec![file.clone()]);
        assert!(ProjectLoader::collect_plugins(&dir.path().join("gone"), &scan).unwrap().is_empty());
    }
}
