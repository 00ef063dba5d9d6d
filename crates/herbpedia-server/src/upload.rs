//! Reading the multipart image field and spooling it to a per-request file.

use std::io::Write;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use tempfile::NamedTempFile;

/// Multipart field that carries the photo.
pub const IMAGE_FIELD: &str = "image";

/// File name prefix for spooled uploads inside the scratch directory.
pub const SPOOL_PREFIX: &str = "upload-";

/// Return the first `image` field that was sent as a file.
///
/// Plain form values named `image` (no file name) are ignored, like any other
/// field.
pub async fn read_image_field(mut multipart: Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) && field.file_name().is_some() {
            return field.bytes().await.map(Some);
        }
    }
    Ok(None)
}

/// An upload written to a uniquely named file, removed when dropped.
pub struct SpooledUpload {
    file: NamedTempFile,
}

impl SpooledUpload {
    pub fn create(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(SPOOL_PREFIX)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
