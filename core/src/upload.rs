//! The selected image and the client-side checks it must pass before any
//! network call is made.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::SessionError;

/// MIME types the client accepts for upload.
pub const ACCEPTED_MIME_TYPES: [&str; 5] =
    ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/bmp"];

/// Largest accepted upload, in bytes (5 MiB, inclusive).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Fallback MIME type for files whose extension we don't recognise.
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// An image picked by the user, held in memory until reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self::new(name, mime_type_for_path(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// `data:` URL for rendering a preview.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Check the declared type first, then the size.
pub fn validate(file: &ImageFile) -> Result<(), SessionError> {
    check_metadata(&file.mime_type, file.size())
}

/// The same checks on metadata alone, so hosts can refuse a file before
/// reading its contents. The type must match one of
/// [`ACCEPTED_MIME_TYPES`] exactly.
pub fn check_metadata(mime_type: &str, size: u64) -> Result<(), SessionError> {
    if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
        return Err(SessionError::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(SessionError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

/// Map a file extension to the MIME type a browser would report for it.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => UNKNOWN_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file_of(mime: &str, size: usize) -> ImageFile {
        ImageFile::new("leaf", mime, vec![0u8; size])
    }

    #[test]
    fn test_accepts_every_listed_type() {
        for mime in ACCEPTED_MIME_TYPES {
            assert!(validate(&file_of(mime, 1024)).is_ok(), "{} should be accepted", mime);
        }
    }

    #[test]
    fn test_rejects_unlisted_types() {
        for mime in ["image/webp", "image/svg+xml", "application/pdf", "text/plain", ""] {
            let err = validate(&file_of(mime, 10)).unwrap_err();
            assert!(
                matches!(err, SessionError::UnsupportedType { .. }),
                "{} should be rejected as unsupported, got {:?}",
                mime,
                err
            );
        }
    }

    #[test]
    fn test_type_match_is_exact() {
        for mime in ["IMAGE/PNG", "Image/Jpeg", " image/png ", "image/png\n"] {
            assert!(
                matches!(
                    validate(&file_of(mime, 10)).unwrap_err(),
                    SessionError::UnsupportedType { .. }
                ),
                "{:?} should be rejected",
                mime
            );
        }
    }

    #[test]
    fn test_metadata_check_without_bytes() {
        assert!(check_metadata("image/gif", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            check_metadata("image/png", 3 * 1024 * 1024 * 1024).unwrap_err(),
            SessionError::TooLarge {
                size: 3 * 1024 * 1024 * 1024,
                max: MAX_UPLOAD_BYTES
            }
        );
        assert!(matches!(
            check_metadata("video/mp4", 10).unwrap_err(),
            SessionError::UnsupportedType { .. }
        ));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate(&file_of("image/png", MAX_UPLOAD_BYTES as usize)).is_ok());

        let err = validate(&file_of("image/png", MAX_UPLOAD_BYTES as usize + 1)).unwrap_err();
        assert_eq!(
            err,
            SessionError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                max: MAX_UPLOAD_BYTES
            }
        );
    }

    #[test]
    fn test_type_checked_before_size() {
        let err = validate(&file_of("image/tiff", MAX_UPLOAD_BYTES as usize + 10)).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedType { .. }));
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path(&PathBuf::from("leaf.JPG")), "image/jpeg");
        assert_eq!(mime_type_for_path(&PathBuf::from("leaf.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for_path(&PathBuf::from("a/b/leaf.png")), "image/png");
        assert_eq!(mime_type_for_path(&PathBuf::from("leaf.bmp")), "image/bmp");
        assert_eq!(mime_type_for_path(&PathBuf::from("leaf.webp")), UNKNOWN_MIME_TYPE);
        assert_eq!(mime_type_for_path(&PathBuf::from("leaf")), UNKNOWN_MIME_TYPE);
    }

    #[test]
    fn test_data_url() {
        let file = ImageFile::new("x.png", "image/png", b"abc".to_vec());
        assert_eq!(file.data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_from_path_reads_bytes_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.name, "photo.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size(), 4);
    }
}
