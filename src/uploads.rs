//! Local image storage for book covers.
//!
//! Stands in for an external object-storage provider: uploads are written
//! under a configured directory and addressed by a URL path. The domain
//! services only ever see the resulting URL string.

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};

/// URL prefix under which stored images are served.
pub const URL_PREFIX: &str = "/uploads";

/// Stores uploaded images on the local filesystem.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a new image store rooted at the given directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Save image bytes under a fresh name, keeping the original extension.
    /// Returns the URL path the image is served at.
    pub fn save(&self, original_name: Option<&str>, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(AppError::Validation("Image upload is empty".to_string()));
        }

        let extension = original_name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(char::is_alphanumeric))
            .unwrap_or("jpg")
            .to_lowercase();

        let name = format!("{}.{}", uuid::Uuid::new_v4(), extension);

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(&name), data)?;

        Ok(format!("{}/{}", URL_PREFIX, name))
    }

    /// Resolve a stored file name to its on-disk path.
    ///
    /// The name must be a bare file name; anything path-like is rejected so
    /// requests cannot escape the upload directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(AppError::Validation("Invalid file name".to_string()));
        }

        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(AppError::NotFound(format!("Upload '{}' not found", name)));
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_resolve() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().to_path_buf());

        let url = store.save(Some("cover.png"), b"png-bytes").unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.strip_prefix("/uploads/").unwrap();
        let path = store.resolve(name).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_save_defaults_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().to_path_buf());

        let url = store.save(None, b"bytes").unwrap();
        assert!(url.ends_with(".jpg"));
    }

    #[test]
    fn test_empty_upload_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().to_path_buf());

        assert!(store.save(Some("cover.jpg"), b"").is_err());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().to_path_buf());

        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("a/b.jpg").is_err());
        assert!(store.resolve("").is_err());
    }
}
