//! Upload validation policy.
//!
//! Runs entirely in memory, before any network call: the declared size,
//! the declared content type and the filename extension are all checked.
//! Declared headers are client-supplied and untrusted on their own, which
//! is why the MIME and extension checks must both pass.

use bytes::Bytes;

use crate::error::CatalogError;

/// Extension→canonical MIME table. Fixed by policy, not configurable.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".webp", "image/webp"),
];

/// A candidate image upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    pub filename: String,
    /// Declared content type from the request, untrusted.
    pub content_type: String,
}

impl ImageUpload {
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Size and type limits for product image uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl UploadPolicy {
    #[must_use]
    pub fn new(max_bytes: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_types,
        }
    }

    /// Accept/reject decision for a candidate upload.
    ///
    /// # Errors
    ///
    /// `FileTooLarge` when the size limit is exceeded; `InvalidFileType`
    /// when either the declared MIME type or the extension's canonical
    /// MIME type is not allow-listed, or the extension is unknown.
    pub fn check(&self, upload: &ImageUpload) -> Result<(), CatalogError> {
        if upload.size() > self.max_bytes {
            return Err(CatalogError::FileTooLarge {
                size: upload.size(),
                max: self.max_bytes,
            });
        }

        if !self.is_allowed(&upload.content_type) {
            return Err(CatalogError::invalid_file_type(format!(
                "declared content type {} is not allowed",
                upload.content_type
            )));
        }

        let ext = extension(&upload.filename);
        let canonical = EXTENSION_TYPES
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, mime)| *mime)
            .ok_or_else(|| {
                CatalogError::invalid_file_type(format!(
                    "unrecognized extension in {}",
                    upload.filename
                ))
            })?;

        if !self.is_allowed(canonical) {
            return Err(CatalogError::invalid_file_type(format!(
                "extension {ext} maps to disallowed type {canonical}"
            )));
        }

        Ok(())
    }

    fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == content_type)
    }
}

impl Default for UploadPolicy {
    /// 10 MiB limit; JPEG, PNG and WebP allowed.
    fn default() -> Self {
        Self::new(
            10 * 1024 * 1024,
            vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
        )
    }
}

fn extension(filename: &str) -> String {
    filename
        .rfind('.')
        .map(|i| filename[i..].to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn upload(filename: &str, content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            data: Bytes::from(vec![0u8; len]),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    #[test]
    fn accepts_known_types() {
        let policy = UploadPolicy::default();
        policy.check(&upload("chair.jpg", "image/jpeg", 100)).unwrap();
        policy.check(&upload("CHAIR.JPEG", "image/jpeg", 100)).unwrap();
        policy.check(&upload("sofa.png", "image/png", 100)).unwrap();
        policy.check(&upload("bed.webp", "image/webp", 100)).unwrap();
    }

    #[test]
    fn rejects_oversized_uploads() {
        let policy = UploadPolicy::new(64, vec!["image/png".into()]);
        let err = policy.check(&upload("a.png", "image/png", 65)).unwrap_err();
        assert!(matches!(err, CatalogError::FileTooLarge { size: 65, max: 64 }));
    }

    #[test]
    fn rejects_disallowed_declared_type() {
        let policy = UploadPolicy::default();
        let err = policy
            .check(&upload("a.png", "application/pdf", 10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn rejects_unknown_extension() {
        let policy = UploadPolicy::default();
        let err = policy.check(&upload("a.gif", "image/png", 10)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFileType { .. }));

        let err = policy
            .check(&upload("no-extension", "image/png", 10))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFileType { .. }));
    }

    #[test]
    fn extension_must_map_to_allowed_type() {
        // Declared type is allowed, but the extension's canonical type is not.
        let policy = UploadPolicy::new(1024, vec!["image/png".into()]);
        let err = policy.check(&upload("a.jpg", "image/png", 10)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFileType { .. }));
    }
}
