use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// A failed run never leaves a half-written compose file behind.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Sibling backup path for `path`: the same name with `.bak` appended.
/// `with_extension` would clobber the existing extension, so append by hand.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write `data` to `path`'s backup file, overwriting any prior backup.
/// Returns the backup path. There is no versioning — one backup per file.
pub fn write_backup(path: &Path, data: &[u8]) -> Result<PathBuf> {
    let bak = backup_path(path);
    atomic_write(&bak, data)?;
    Ok(bak)
}
