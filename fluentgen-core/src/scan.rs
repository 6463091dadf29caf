//! Parallel, deterministic discovery of input documents with directory pruning.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Input document suffix.
pub const INPUT_SUFFIX: &str = ".fluent.json";

/// Directories never searched.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn is_input_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(INPUT_SUFFIX))
}

/// Gathers every `*.fluent.json` below `root`, sorted by path.
///
/// A file path is returned as-is when it is itself an input document.
pub fn gather_input_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        // Prune whole subtrees before they are walked
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) if is_input_file(e.path()) => Some(Ok(e.path().to_path_buf())),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather input files from {}", root.display()))?;

    // par_bridge yields in arbitrary order
    files.sort();
    Ok(files)
}
