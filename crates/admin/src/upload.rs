//! Image files attached to multipart forms.

use std::path::Path;

use reqwest::multipart::Part;

use crate::error::AdminError;

/// Largest image the API accepts.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image to upload with a product or setting.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Content type for a supported image extension.
fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

impl ImageUpload {
    /// Wrap in-memory bytes.
    ///
    /// # Errors
    ///
    /// Rejects unsupported extensions, empty files and files over
    /// [`MAX_IMAGE_BYTES`].
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AdminError> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).ok_or_else(|| {
            AdminError::validation(format!(
                "Unsupported image type: {file_name} (use jpg, png, webp or gif)"
            ))
        })?;
        if bytes.is_empty() {
            return Err(AdminError::validation("Image file is empty"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AdminError::validation(format!(
                "Image is larger than {} MB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Upload` if the file cannot be read, or the
    /// checks of [`ImageUpload::from_bytes`].
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AdminError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AdminError::Upload {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_owned();
        Self::from_bytes(file_name, bytes)
    }

    /// Convert into a multipart part.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is rejected by `reqwest`.
    pub(crate) fn into_part(self) -> Result<Part, AdminError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.content_type)
            .map_err(|e| AdminError::Api(e.into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("banner.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("logo.png"), Some("image/png"));
        assert_eq!(content_type_for("notes.txt"), None);
        assert_eq!(content_type_for("noext"), None);
    }

    #[test]
    fn test_from_bytes_checks() {
        assert!(ImageUpload::from_bytes("a.png", vec![1, 2, 3]).is_ok());
        assert!(ImageUpload::from_bytes("a.png", vec![]).is_err());
        assert!(ImageUpload::from_bytes("a.bmp", vec![1]).is_err());
        assert!(ImageUpload::from_bytes("a.png", vec![0; MAX_IMAGE_BYTES + 1]).is_err());
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.webp");
        std::fs::write(&path, b"RIFF....WEBP").unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "hero.webp");
        assert_eq!(upload.content_type, "image/webp");

        let missing = ImageUpload::from_path(dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(AdminError::Upload { .. })));
    }

    #[test]
    fn test_debug_omits_bytes() {
        let upload = ImageUpload::from_bytes("a.png", vec![7; 10]).unwrap();
        let debug = format!("{upload:?}");
        assert!(debug.contains("len: 10"));
        assert!(!debug.contains("[7, 7"));
    }
}
