use std::fmt;

use super::document::DocumentBuffer;

/// A 1-indexed, inclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub buffer: DocumentBuffer,
    pub index: usize,
    pub range: PageRange,
    pub total_chunks: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    pub chunk_index: usize,
    pub start_page: u32,
    pub end_page: u32,
    pub text: String,
    pub success: bool,
    pub error: Option<String>,
    pub processing_time_ms: u64,
}

impl ChunkResult {
    pub fn succeeded(
        chunk_index: usize,
        range: PageRange,
        text: String,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            chunk_index,
            start_page: range.start,
            end_page: range.end,
            text,
            success: true,
            error: None,
            processing_time_ms,
        }
    }

    pub fn failed(
        chunk_index: usize,
        range: PageRange,
        error: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            chunk_index,
            start_page: range.start,
            end_page: range.end,
            text: String::new(),
            success: false,
            error: Some(error.into()),
            processing_time_ms,
        }
    }
}
