use crate::domain::SupportedFileType;

pub const DEFAULT_MIN_FILE_SIZE_BYTES: u64 = 100;
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub file_type: SupportedFileType,
}

/// Magic-byte classification plus size bounds for incoming documents.
#[derive(Debug, Clone, Copy)]
pub struct FileTypeDetector {
    min_size_bytes: u64,
    max_size_bytes: u64,
}

impl FileTypeDetector {
    pub fn new(min_size_bytes: u64, max_size_bytes: u64) -> Self {
        Self {
            min_size_bytes,
            max_size_bytes,
        }
    }

    pub fn detect(&self, data: &[u8]) -> SupportedFileType {
        SupportedFileType::detect(data)
    }

    /// Checks every rule and reports all violations instead of stopping at the first.
    pub fn validate(&self, data: &[u8], filename: &str, size_bytes: u64) -> ValidationReport {
        let file_type = self.detect(data);
        let mut errors = Vec::new();

        if filename.trim().is_empty() {
            errors.push("file name is empty".to_string());
        }

        if size_bytes < self.min_size_bytes {
            errors.push(format!(
                "file size {size_bytes} bytes is below the minimum size of {} bytes",
                self.min_size_bytes
            ));
        }

        if size_bytes > self.max_size_bytes {
            errors.push(format!(
                "file size {size_bytes} bytes exceeds the maximum size of {} bytes",
                self.max_size_bytes
            ));
        }

        if !file_type.is_supported() {
            errors.push(format!(
                "unsupported file type for {filename}: expected PDF, JPEG, or PNG"
            ));
        }

        if !errors.is_empty() {
            tracing::warn!(filename, size_bytes, ?errors, "Document failed validation");
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            file_type,
        }
    }
}

impl Default for FileTypeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FILE_SIZE_BYTES, DEFAULT_MAX_FILE_SIZE_BYTES)
    }
}
