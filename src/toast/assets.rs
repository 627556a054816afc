//! Relocation of WSL-side images into a Windows-readable location
//!
//! Toast XML is rendered on the Windows side, so image paths inside it
//! must be Windows paths. Images that live in the WSL filesystem are
//! copied into the Windows temp directory, named by content hash so the
//! same image is only ever copied once.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::winpath;

/// Filename prefix for relocated images in the Windows temp directory
const ASSET_PREFIX: &str = "wsl-notify";

/// Copy a WSL-side image into the Windows temp directory and return the
/// Windows path of the copy.
///
/// Returns `None` when the source cannot be read or the copy fails. A
/// missing image degrades the toast, it must not abort delivery, so the
/// failure is only logged here.
pub async fn relocate(src: &str) -> Option<String> {
    match try_relocate(src).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Failed to relocate image {}: {:#}", src, e);
            None
        }
    }
}

async fn try_relocate(src: &str) -> Result<String> {
    let temp_win = winpath::windows_temp_dir().await?;
    let temp_unix = winpath::to_unix(&temp_win).await?;
    let target = relocate_into(src, &temp_unix).await?;
    winpath::to_windows(&target).await
}

/// Canonicalize, hash and copy `src` into `dest_dir`, returning the
/// target path. The copy is skipped when a file with the same content
/// hash already exists.
async fn relocate_into(src: &str, dest_dir: &Path) -> Result<PathBuf> {
    let src = tokio::fs::canonicalize(src)
        .await
        .context("Failed to resolve image path")?;

    let hash = hash_file(&src).await?;
    let target = dest_dir.join(asset_file_name(&src, &hash));

    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        debug!("Image already relocated: {}", target.display());
    } else {
        copy_into_place(&src, &target).await?;
        debug!("Relocated {} to {}", src.display(), target.display());
    }

    Ok(target)
}

/// SHA-256 of the file contents, as a hex string
async fn hash_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .context("Failed to read image file")?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// `wsl-notify-<hash><ext>` — content-addressed so identical images,
/// even from different source paths, share one copy
fn asset_file_name(src: &Path, hash: &str) -> String {
    match src.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", ASSET_PREFIX, hash, ext),
        None => format!("{}-{}", ASSET_PREFIX, hash),
    }
}

/// Copy through a temp file and rename, so a concurrent reader never
/// sees a half-written asset
async fn copy_into_place(src: &Path, target: &Path) -> Result<()> {
    let dir = target
        .parent()
        .context("Asset target has no parent directory")?;
    let tmp = tempfile::NamedTempFile::new_in(dir)
        .context("Failed to create temporary file for image copy")?;
    tokio::fs::copy(src, tmp.path())
        .await
        .context("Failed to copy image")?;
    tmp.persist(target)
        .context("Failed to move image into place")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_same_content_hashes_equal() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.png", "hello").await;
        let b = write_file(dir.path(), "b.png", "hello").await;

        assert_eq!(hash_file(&a).await.unwrap(), hash_file(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_different_content_hashes_differ() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.png", "hello").await;
        let b = write_file(dir.path(), "b.png", "world").await;

        assert_ne!(hash_file(&a).await.unwrap(), hash_file(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_is_sha256_hex() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.png", "test").await;

        let hash = hash_file(&path).await.unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_relocate_copies_file() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let src = write_file(src_dir.path(), "icon.png", "image bytes").await;

        let target = relocate_into(&src.to_string_lossy(), dest_dir.path())
            .await
            .unwrap();

        assert!(target.starts_with(dest_dir.path()));
        let copied = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(copied, "image bytes");
    }

    #[tokio::test]
    async fn test_relocate_preserves_extension() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let src = write_file(src_dir.path(), "icon.png", "x").await;

        let target = relocate_into(&src.to_string_lossy(), dest_dir.path())
            .await
            .unwrap();

        let name = target.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("wsl-notify-"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_relocate_is_idempotent_across_source_paths() {
        let src_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let a = write_file(src_dir.path(), "a.png", "same content").await;
        let b = write_file(src_dir.path(), "b.png", "same content").await;

        let first = relocate_into(&a.to_string_lossy(), dest_dir.path())
            .await
            .unwrap();
        let second = relocate_into(&b.to_string_lossy(), dest_dir.path())
            .await
            .unwrap();

        // same target, and exactly one physical copy in the directory
        assert_eq!(first, second);
        let count = std::fs::read_dir(dest_dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_missing_source_is_absent() {
        assert!(relocate("/nonexistent/image.png").await.is_none());
    }
}
