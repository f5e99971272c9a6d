//! Atomic file replacement for the vault record.
//!
//! A record is either the previous content or the new content after a crash,
//! never a truncated mix: content goes to a temp file in the target directory,
//! is fsynced, then renamed over the target.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;

/// Atomically write `content` to `path`, creating parent directories.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    let temp_dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    temp_file
        .persist(path.as_std_path())
        .map_err(|e| anyhow::anyhow!(e.error))
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let target = utf8(&dir).join("vault").join("encrypted_key");

        write_file_atomic(&target, "AAEC").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "AAEC");
    }

    #[test]
    fn test_write_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let target = utf8(&dir).join("record");

        write_file_atomic(&target, "first").unwrap();
        write_file_atomic(&target, "second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn test_write_leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let target = utf8(&dir).join("record");

        write_file_atomic(&target, "payload").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_content_is_written_byte_for_byte() {
        let dir = TempDir::new().unwrap();
        let target = utf8(&dir).join("record");

        write_file_atomic(&target, "line1\r\nline2").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "line1\r\nline2");
    }
}
