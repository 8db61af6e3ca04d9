use crate::domain::model::CalculationRequest;
use crate::utils::error::{ChainError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ChainError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ChainError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ChainError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ChainError::Validation {
            field: field_name.to_string(),
            reason: "value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ChainError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Fail-fast checks on a calculation request, run before any network call.
pub fn validate_request(request: &CalculationRequest, max_pdf_bytes: usize) -> Result<()> {
    if request.pdf.is_empty() {
        return Err(ChainError::Validation {
            field: "pdf".to_string(),
            reason: "PDF content is empty".to_string(),
        });
    }
    if request.pdf.len() > max_pdf_bytes {
        return Err(ChainError::Validation {
            field: "pdf".to_string(),
            reason: format!(
                "PDF size {} bytes exceeds maximum allowed size of {} bytes",
                request.pdf.len(),
                max_pdf_bytes
            ),
        });
    }
    validate_non_empty_string("location", &request.location)
}

/// Loose PDF signature check for files read off disk. Uploaded byte buffers
/// are accepted as-is; the model rejects what it cannot read.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

pub fn validate_pdf_extension(field_name: &str, path: &str) -> Result<()> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => Ok(()),
        _ => Err(ChainError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Only .pdf files are accepted".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_endpoint", "https://example.com").is_ok());
        assert!(validate_url("api_endpoint", "http://example.com").is_ok());
        assert!(validate_url("api_endpoint", "").is_err());
        assert!(validate_url("api_endpoint", "invalid-url").is_err());
        assert!(validate_url("api_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_request_rejects_empty_inputs() {
        let empty_pdf = CalculationRequest::new(Vec::new(), "94110");
        assert!(matches!(
            validate_request(&empty_pdf, 1024),
            Err(ChainError::Validation { field, .. }) if field == "pdf"
        ));

        let empty_location = CalculationRequest::new(b"%PDF-1.4".to_vec(), "  ");
        assert!(matches!(
            validate_request(&empty_location, 1024),
            Err(ChainError::Validation { field, .. }) if field == "location"
        ));

        let valid = CalculationRequest::new(b"%PDF-1.4".to_vec(), "94110");
        assert!(validate_request(&valid, 1024).is_ok());
    }

    #[test]
    fn test_validate_request_enforces_size_limit() {
        let oversized = CalculationRequest::new(vec![0u8; 2048], "94110");
        assert!(validate_request(&oversized, 1024).is_err());
    }

    #[test]
    fn test_pdf_signature_and_extension() {
        assert!(looks_like_pdf(b"%PDF-1.7 rest"));
        assert!(!looks_like_pdf(b"PK\x03\x04"));

        assert!(validate_pdf_extension("pdf", "plans.pdf").is_ok());
        assert!(validate_pdf_extension("pdf", "plans.PDF").is_ok());
        assert!(validate_pdf_extension("pdf", "plans.docx").is_err());
        assert!(validate_pdf_extension("pdf", "plans").is_err());
    }
}
