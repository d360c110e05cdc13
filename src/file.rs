use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Entries of `path` that are not directories, in the order the filesystem
/// returns them. Subdirectories are never descended into.
pub fn list_files(path: &Path) -> Result<Vec<PathBuf>, io::Error> {
    let dir = fs::read_dir(path)?;
    let files = dir.map(|res| res.map(|e| e.path()));
    let mut paths = vec!();
    for file_buff in files {
        match file_buff {
            Ok(b) if b.is_dir() => continue,
            Ok(b) => paths.push(b),
            Err(e) => warn!(dir = %path.display(), "failed to read a path due to {:?}", e)
        }
    }

    Ok(paths)
}
