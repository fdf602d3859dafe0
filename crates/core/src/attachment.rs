//! Transient file attachments.
//!
//! An [`Attachment`] is the in-memory handle for a file the user picked: its original name, a
//! media type, and the bytes. Attachments are never cached; they are converted into multipart
//! parts when a request is built and dropped afterwards.

use crate::models::RecordFileType;
use crate::{ClientError, ClientResult};
use bytes::Bytes;
use std::path::Path;

/// Media type used when content sniffing does not recognise the bytes.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A file handle plus its declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    media_type: String,
    bytes: Bytes,
}

impl Attachment {
    /// Create an attachment with an explicit media type.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Create an attachment, detecting the media type from the content.
    ///
    /// Detection is best-effort (magic numbers via `infer`) and falls back to
    /// [`FALLBACK_MEDIA_TYPE`].
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let media_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(FALLBACK_MEDIA_TYPE);
        Self::new(file_name, media_type, bytes)
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AttachmentRead`] if the file cannot be read.
    pub fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| ClientError::AttachmentRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|os| os.to_str())
            .unwrap_or("upload")
            .to_owned();
        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// An attachment carrying the category tag the records endpoint expects in `file_types`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedAttachment {
    pub attachment: Attachment,
    pub file_type: RecordFileType,
}

impl TaggedAttachment {
    pub fn new(attachment: Attachment, file_type: RecordFileType) -> Self {
        Self {
            attachment,
            file_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_from_bytes_detects_png() {
        let att = Attachment::from_bytes("fundus.png", PNG_MAGIC.to_vec());
        assert_eq!(att.media_type(), "image/png");
        assert!(att.is_image());
    }

    #[test]
    fn test_from_bytes_falls_back_for_unknown_content() {
        let att = Attachment::from_bytes("notes.bin", b"plain words".to_vec());
        assert_eq!(att.media_type(), FALLBACK_MEDIA_TYPE);
        assert!(!att.is_image());
    }

    #[test]
    fn test_from_path_keeps_file_name() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let att = Attachment::from_path(file.path()).unwrap();
        let expected = file.path().file_name().unwrap().to_str().unwrap();
        assert_eq!(att.file_name(), expected);
        assert_eq!(att.len(), PNG_MAGIC.len());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Attachment::from_path(&dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, ClientError::AttachmentRead { .. }));
    }

    #[test]
    fn test_debug_does_not_dump_bytes() {
        let att = Attachment::new("scan.jpg", "image/jpeg", vec![1u8; 64]);
        let rendered = format!("{att:?}");
        assert!(rendered.contains("len: 64"));
        assert!(!rendered.contains("[1, 1"));
    }
}
