use std::fmt;

use serde::Serialize;

const PDF_MAGIC: &[u8] = &[0x25, 0x50, 0x44, 0x46];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const SIGNATURE_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupportedFileType {
    Pdf,
    Jpeg,
    Png,
    Unknown,
}

impl SupportedFileType {
    /// Classifies a buffer by its leading magic bytes. Buffers shorter than
    /// four bytes are always `Unknown`.
    pub fn detect(data: &[u8]) -> Self {
        if data.len() < SIGNATURE_LEN {
            return Self::Unknown;
        }

        let head = &data[..SIGNATURE_LEN];
        if head.starts_with(PDF_MAGIC) {
            Self::Pdf
        } else if head.starts_with(JPEG_MAGIC) {
            Self::Jpeg
        } else if head.starts_with(PNG_MAGIC) {
            Self::Png
        } else {
            Self::Unknown
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Unknown => "application/octet-stream",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

impl fmt::Display for SupportedFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
