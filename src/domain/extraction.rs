use std::fmt;

use serde::{Deserialize, Serialize};

use super::file_type::SupportedFileType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExtractionMethod {
    #[serde(alias = "ocr")]
    Ocr,
    #[serde(alias = "vision")]
    Vision,
    #[serde(alias = "hybrid")]
    Hybrid,
    #[serde(alias = "fallback")]
    Fallback,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocr => "OCR",
            Self::Vision => "VISION",
            Self::Hybrid => "HYBRID",
            Self::Fallback => "FALLBACK",
        }
    }

    /// Shortest trimmed text, in characters, accepted as a successful
    /// extraction for this method.
    pub fn min_text_len(&self) -> usize {
        match self {
            Self::Ocr => 20,
            Self::Vision | Self::Hybrid | Self::Fallback => 50,
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ocr" => Ok(Self::Ocr),
            "vision" => Ok(Self::Vision),
            "hybrid" => Ok(Self::Hybrid),
            "fallback" => Ok(Self::Fallback),
            other => Err(format!(
                "Invalid extraction method: {other}. Expected: ocr, vision, or hybrid"
            )),
        }
    }
}

pub fn meets_min_text_len(text: &str, method: ExtractionMethod) -> bool {
    text.trim().chars().count() >= method.min_text_len()
}

/// Diagnostics attached to a result, one variant per known shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProcessingDetail {
    #[serde(rename_all = "camelCase")]
    Chunking {
        page_count: u32,
        total_chunks: usize,
        successful_chunks: usize,
        failed_chunks: usize,
        chunked: bool,
    },
    #[serde(rename_all = "camelCase")]
    CostEstimate {
        method: ExtractionMethod,
        pages: u32,
        estimated_usd: f64,
    },
    #[serde(rename_all = "camelCase")]
    FailureReason { stage: String, reason: String },
    #[serde(rename_all = "camelCase")]
    Attempts { stage: String, attempts: u32 },
    #[serde(rename_all = "camelCase")]
    Compression {
        original_bytes: usize,
        compressed_bytes: usize,
    },
    #[serde(rename_all = "camelCase")]
    Note { message: String },
}

impl ProcessingDetail {
    pub fn failure(stage: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::FailureReason {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::Note {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub page_count: u32,
    pub file_type: SupportedFileType,
    pub extraction_method: ExtractionMethod,
    pub processing_details: Vec<ProcessingDetail>,
}

impl DocumentMetadata {
    pub fn new(file_type: SupportedFileType, extraction_method: ExtractionMethod) -> Self {
        Self {
            page_count: 0,
            file_type,
            extraction_method,
            processing_details: Vec::new(),
        }
    }
}

/// Outcome of one extraction call.
///
/// Build through [`ExtractionResult::succeeded`] and [`ExtractionResult::failed`]:
/// a successful result always carries text that meets its method's minimum
/// length, a failed one carries no text and an error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub extracted_text: String,
    pub method: ExtractionMethod,
    pub metadata: DocumentMetadata,
    pub processing_time_ms: u64,
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn succeeded(
        extracted_text: String,
        method: ExtractionMethod,
        mut metadata: DocumentMetadata,
        processing_time_ms: u64,
    ) -> Self {
        if !meets_min_text_len(&extracted_text, method) {
            metadata
                .processing_details
                .push(ProcessingDetail::failure(method.as_str(), "text below minimum length"));
            return Self::failed(
                format!(
                    "NoTextExtracted: {} characters is below the {} character minimum",
                    extracted_text.trim().chars().count(),
                    method.min_text_len()
                ),
                method,
                metadata,
                processing_time_ms,
            );
        }

        metadata.extraction_method = method;
        Self {
            success: true,
            extracted_text,
            method,
            metadata,
            processing_time_ms,
            error: None,
        }
    }

    pub fn failed(
        error: impl Into<String>,
        method: ExtractionMethod,
        mut metadata: DocumentMetadata,
        processing_time_ms: u64,
    ) -> Self {
        metadata.extraction_method = method;
        Self {
            success: false,
            extracted_text: String::new(),
            method,
            metadata,
            processing_time_ms,
            error: Some(error.into()),
        }
    }
}
