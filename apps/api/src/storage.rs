//! Object storage and resume file handling.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

const PDF_MIME: &str = "application/pdf";
const TEXT_MIME: &str = "text/plain";

/// Result of persisting one uploaded file.
pub struct StoredFile {
    pub url: String,
    pub key: String,
}

/// Uploads raw bytes under `folder/` with a generated key.
pub async fn upload_file(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    bytes: Bytes,
    folder: &str,
    content_type: &str,
) -> Result<StoredFile, AppError> {
    let extension = match content_type {
        PDF_MIME => "pdf",
        _ => "txt",
    };
    let key = format!("{}/{}.{}", folder, Uuid::new_v4(), extension);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded file to s3://{bucket}/{key}");

    Ok(StoredFile {
        url: format!("s3://{bucket}/{key}"),
        key,
    })
}

/// Extracts plain text from an uploaded resume. PDF and plain text are the
/// only supported formats; extraction failure is fatal for the upload.
pub fn parse_resume_file(bytes: &[u8], content_type: &str) -> Result<String, AppError> {
    let text = match content_type {
        PDF_MIME => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::UnprocessableEntity(format!("PDF extraction failed: {e}")))?,
        TEXT_MIME => String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::UnprocessableEntity("resume is not valid UTF-8".to_string()))?,
        other => {
            return Err(AppError::Validation(format!(
                "unsupported resume content type '{other}'; use {PDF_MIME} or {TEXT_MIME}"
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "resume contained no extractable text".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let text = parse_resume_file(b"Jane Doe\nRust engineer", TEXT_MIME).unwrap();
        assert!(text.contains("Rust engineer"));
    }

    #[test]
    fn test_unsupported_content_type_rejected() {
        let result = parse_resume_file(b"...", "application/msword");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_text_rejected() {
        let result = parse_resume_file(b"   \n  ", TEXT_MIME);
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = parse_resume_file(&[0xff, 0xfe, 0x80], TEXT_MIME);
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }
}
