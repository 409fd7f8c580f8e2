use axum_typed_multipart::{FieldData, TryFromMultipart};
use bytes::Bytes;

use crate::errors::AppError;

pub const MIB: usize = 1024 * 1024;

/// Multipart body accepted by every upload endpoint: one file in `image`
/// plus an optional free-text `description`.
#[derive(TryFromMultipart)]
pub struct UploadForm {
    #[form_data(limit = "unlimited")]
    pub image: Option<FieldData<Bytes>>,
    pub description: Option<String>,
}

/// Restrictions checked before anything is written to disk.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub allowed_types: Option<&'static [&'static str]>,
    pub max_bytes: Option<usize>,
}

impl UploadPolicy {
    pub const UNRESTRICTED: UploadPolicy = UploadPolicy {
        allowed_types: None,
        max_bytes: None,
    };

    /// JPEG, PNG or GIF up to 10 MiB.
    pub const WEB_IMAGES: UploadPolicy = UploadPolicy {
        allowed_types: Some(&["image/jpeg", "image/png", "image/gif"]),
        max_bytes: Some(10 * MIB),
    };

    pub fn accept(&self, field: Option<FieldData<Bytes>>) -> Result<AcceptedFile, AppError> {
        let field = field.ok_or_else(|| AppError::Upload("No image uploaded".into()))?;

        let file_name = field
            .metadata
            .file_name
            .filter(|name| !name.trim().is_empty());
        if file_name.is_none() && field.contents.is_empty() {
            return Err(AppError::Upload("No image uploaded".into()));
        }

        let content_type = field.metadata.content_type;

        if let Some(allowed) = self.allowed_types {
            let mime = content_type.as_deref().unwrap_or_default();
            let essence = mime.split(';').next().unwrap_or_default().trim();
            if !allowed.iter().any(|t| t.eq_ignore_ascii_case(essence)) {
                return Err(AppError::Upload(
                    "Only JPG, PNG and GIF images are supported".into(),
                ));
            }
        }

        if let Some(max_bytes) = self.max_bytes {
            if field.contents.len() > max_bytes {
                return Err(AppError::Upload(format!(
                    "File too large: {} bytes exceeds the {} byte limit",
                    field.contents.len(),
                    max_bytes
                )));
            }
        }

        Ok(AcceptedFile {
            file_name,
            content_type,
            contents: field.contents,
        })
    }
}

#[derive(Debug)]
pub struct AcceptedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub contents: Bytes,
}
