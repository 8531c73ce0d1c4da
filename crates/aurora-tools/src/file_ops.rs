//! The `file_read`/`file_write`/`file_delete` Action kinds.
//!
//! Grounded on the teacher's read/write tool idiom (parent-directory
//! creation on write, plain UTF-8 read), stripped of the `cat -n`
//! line-numbering formatting a chat coding tool adds for LLM context —
//! an Action's result is the raw content or byte count, per spec.

use std::path::Path;

use crate::error::ToolsResult;

/// Read the full contents of `path` as UTF-8 text.
pub async fn file_read(path: &Path) -> ToolsResult<String> {
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Write `content` to `path`, creating parent directories as needed and
/// overwriting any existing file. Returns the number of bytes written.
pub async fn file_write(path: &Path, content: &str) -> ToolsResult<usize> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(content.len())
}

/// Delete `path`.
pub async fn file_delete(path: &Path) -> ToolsResult<()> {
    tokio::fs::remove_file(path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let written = file_write(&path, "hello").await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(file_read(&path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("c.txt");
        file_write(&path, "nested").await.unwrap();
        assert_eq!(file_read(&path).await.unwrap(), "nested");
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        file_write(&path, "x").await.unwrap();
        file_delete(&path).await.unwrap();
        assert!(file_read(&path).await.is_err());
    }
}
