use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Word keeps `~$name.docx` next to an open document while editing it.
const LOCK_FILE_PREFIX: &str = "~$";

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX))
}

/// The documents to process for `path`.
///
/// A file is returned as-is, whatever its extension; opening it reports
/// whether it is really a `.docx`. A directory is walked recursively for
/// `.docx` files, skipping Word lock files, in path order.
pub fn discover_documents(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let mut results: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_docx(p) && !is_lock_file(p))
        .collect();
    results.sort();
    results
}
