//! Student photo storage
//!
//! The student row keeps only an opaque reference; the blob itself lives in
//! a [`PhotoStore`]. The filesystem implementation backs the local profile
//! and tests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for photo blob storage implementations
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store a photo for the given student, returning the reference to
    /// record on the student row.
    async fn store(&self, student_id: Uuid, bytes: &[u8]) -> Result<String>;

    /// Load the blob behind a previously returned reference.
    async fn load(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed photo store writing one file per student.
#[derive(Debug, Clone)]
pub struct FsPhotoStore {
    root: PathBuf,
}

impl FsPhotoStore {
    /// Creates a store rooted at `root`; the directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn validate_reference(reference: &str) -> Result<()> {
        // References are bare file names; anything path-like is rejected.
        let valid = !reference.is_empty()
            && reference
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if !valid {
            bail!("invalid photo reference '{}'", reference);
        }
        Ok(())
    }
}

#[async_trait]
impl PhotoStore for FsPhotoStore {
    async fn store(&self, student_id: Uuid, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating photo directory {}", self.root.display()))?;

        let reference = format!("{}.img", student_id);
        let path = self.root.join(&reference);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing photo {}", path.display()))?;

        Ok(reference)
    }

    async fn load(&self, reference: &str) -> Result<Vec<u8>> {
        Self::validate_reference(reference)?;

        let path = self.root.join(reference);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading photo {}", path.display()))
    }
}

impl FsPhotoStore {
    /// Root directory photos are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
