use bytes::Bytes;
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResumeError {
    #[error("Please choose a resume file")]
    Missing,

    #[error("The selected file is empty")]
    Empty,

    #[error("Only PDF files are accepted (got {0})")]
    NotPdf(String),

    #[error("Resume must be 5 MB or smaller (got {size} bytes)")]
    TooLarge { size: usize },
}

/// A resume file received from the browser, not yet sent anywhere.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ResumeUpload {
    /// Checks type and size. Must pass before the upload reaches the backend.
    pub fn validate(&self) -> Result<(), ResumeError> {
        let content_type = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if !content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            return Err(ResumeError::NotPdf(self.content_type.clone()));
        }
        if self.bytes.is_empty() {
            return Err(ResumeError::Empty);
        }
        if self.bytes.len() > MAX_RESUME_BYTES {
            return Err(ResumeError::TooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> ResumeUpload {
        ResumeUpload {
            file_name: "cv.pdf".to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![b'%'; size]),
        }
    }

    #[test]
    fn test_accepts_pdf_within_limit() {
        assert!(upload("application/pdf", 1024).validate().is_ok());
        assert!(upload("application/pdf", MAX_RESUME_BYTES).validate().is_ok());
    }

    #[test]
    fn test_rejects_other_types() {
        for content_type in ["application/msword", "image/png", "text/plain", ""] {
            assert!(matches!(
                upload(content_type, 10).validate(),
                Err(ResumeError::NotPdf(_))
            ));
        }
    }

    #[test]
    fn test_content_type_parameters_ignored() {
        assert!(upload("Application/PDF; name=cv.pdf", 10).validate().is_ok());
    }

    #[test]
    fn test_rejects_over_five_megabytes() {
        assert_eq!(
            upload("application/pdf", MAX_RESUME_BYTES + 1).validate(),
            Err(ResumeError::TooLarge {
                size: MAX_RESUME_BYTES + 1
            })
        );
    }

    #[test]
    fn test_rejects_empty_file() {
        assert_eq!(upload("application/pdf", 0).validate(), Err(ResumeError::Empty));
    }
}
