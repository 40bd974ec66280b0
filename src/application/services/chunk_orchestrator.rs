use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::ports::{PageSplitter, Sleeper};
use crate::domain::{
    Chunk, ChunkResult, DocumentBuffer, ExtractionError, PageRange, ProcessingDetail,
    SupportedFileType,
};

use super::extraction_context::ExtractionContext;
use super::ocr_extractor::{OcrExtractor, elapsed_ms};
use super::page_counter::PageCounter;

pub const OCR_PAGE_LIMIT: u32 = 30;
pub const MAX_CHUNK_SIZE: u32 = 15;
pub const INTER_CHUNK_DELAY: Duration = Duration::from_secs(1);
/// Upper bound on pages planned from the byte-level heuristic alone.
pub const MAX_PLANNED_PAGES: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingPolicy {
    /// Hard page ceiling of the OCR service; larger documents are split.
    pub ocr_page_limit: u32,
    pub max_chunk_size: u32,
    pub inter_chunk_delay: Duration,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            ocr_page_limit: OCR_PAGE_LIMIT,
            max_chunk_size: MAX_CHUNK_SIZE,
            inter_chunk_delay: INTER_CHUNK_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedChunk {
    Ready(Chunk),
    Failed(ChunkResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPlan {
    pub chunks: Vec<PreparedChunk>,
    pub page_count: u32,
    pub chunked: bool,
    pub notes: Vec<ProcessingDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedExtraction {
    pub success: bool,
    pub text: String,
    pub chunk_results: Vec<ChunkResult>,
    pub page_count: u32,
    pub chunked: bool,
    pub error: Option<ExtractionError>,
    pub notes: Vec<ProcessingDetail>,
}

impl ChunkedExtraction {
    pub fn successful_chunks(&self) -> usize {
        self.chunk_results.iter().filter(|r| r.success).count()
    }

    pub fn details(&self) -> Vec<ProcessingDetail> {
        let successful_chunks = self.successful_chunks();
        let mut details = vec![ProcessingDetail::Chunking {
            page_count: self.page_count,
            total_chunks: self.chunk_results.len(),
            successful_chunks,
            failed_chunks: self.chunk_results.len() - successful_chunks,
            chunked: self.chunked,
        }];
        details.extend(self.notes.iter().cloned());
        details.extend(
            self.chunk_results
                .iter()
                .filter(|r| !r.success)
                .map(|r| {
                    ProcessingDetail::failure(
                        format!("ocr pages {}-{}", r.start_page, r.end_page),
                        r.error.as_deref().unwrap_or("unknown error"),
                    )
                }),
        );
        details
    }
}

/// Splits oversized PDFs into page-range chunks, runs each through OCR in
/// order, and stitches the transcripts back together.
pub struct ChunkOrchestrator {
    ocr: Arc<OcrExtractor>,
    splitter: Arc<dyn PageSplitter>,
    page_counter: PageCounter,
    sleeper: Arc<dyn Sleeper>,
    policy: ChunkingPolicy,
}

impl ChunkOrchestrator {
    pub fn new(
        ocr: Arc<OcrExtractor>,
        splitter: Arc<dyn PageSplitter>,
        sleeper: Arc<dyn Sleeper>,
        policy: ChunkingPolicy,
    ) -> Self {
        Self {
            ocr,
            splitter,
            page_counter: PageCounter::new(),
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &ChunkingPolicy {
        &self.policy
    }

    pub fn needs_chunking(&self, page_count: u32) -> bool {
        page_count > self.policy.ocr_page_limit
    }

    /// Contiguous 1-indexed ranges of at most `max_chunk_size` pages covering
    /// exactly `[1, page_count]`.
    pub fn plan_ranges(&self, page_count: u32) -> Vec<PageRange> {
        let size = self.policy.max_chunk_size.max(1);
        let total = page_count.div_ceil(size);

        (0..total)
            .filter_map(|i| {
                let start = i.saturating_mul(size).saturating_add(1);
                let end = i.saturating_add(1).saturating_mul(size).min(page_count);
                PageRange::new(start, end)
            })
            .collect()
    }

    pub fn prepare_chunks(&self, buffer: &DocumentBuffer) -> ChunkPlan {
        if buffer.file_type != SupportedFileType::Pdf {
            return whole_document_plan(buffer, 1, Vec::new());
        }

        let counted = self.page_counter.count_pages(buffer.as_bytes());
        if !counted.success {
            let error = ExtractionError::ChunkingFailed(
                counted
                    .error
                    .unwrap_or_else(|| "page count unavailable".to_string()),
            );
            tracing::warn!(error = %error, "Falling back to a single whole-document chunk");
            let notes = vec![ProcessingDetail::failure("chunking", &error)];
            return whole_document_plan(buffer, 1, notes);
        }

        if !self.needs_chunking(counted.page_count) {
            return whole_document_plan(buffer, counted.page_count, Vec::new());
        }

        // `/Count` tokens also appear in outlines, so trust the parsed page
        // tree whenever the splitter can read it.
        let mut notes = Vec::new();
        let page_count = match self.splitter.page_count(buffer.as_bytes()) {
            Some(actual) => {
                if actual != counted.page_count {
                    tracing::info!(
                        heuristic = counted.page_count,
                        actual,
                        "Page tree disagrees with the byte-level page count"
                    );
                }
                actual
            }
            None if counted.page_count > MAX_PLANNED_PAGES => {
                let error = ExtractionError::ChunkingFailed(format!(
                    "page count {} exceeds the {MAX_PLANNED_PAGES} page planning cap",
                    counted.page_count
                ));
                tracing::warn!(error = %error, "Capping planned pages");
                notes.push(ProcessingDetail::failure("chunking", &error));
                MAX_PLANNED_PAGES
            }
            None => counted.page_count,
        };

        if !self.needs_chunking(page_count) {
            return whole_document_plan(buffer, page_count, notes);
        }

        let ranges = self.plan_ranges(page_count);
        let total_chunks = ranges.len();
        tracing::info!(
            page_count,
            total_chunks,
            max_chunk_size = self.policy.max_chunk_size,
            "Splitting PDF into page-range chunks"
        );

        let chunks: Vec<PreparedChunk> = ranges
            .into_iter()
            .enumerate()
            .map(|(index, range)| match self.splitter.split(buffer.as_bytes(), range) {
                Ok(data) => PreparedChunk::Ready(Chunk {
                    buffer: buffer.derive(data),
                    index,
                    range,
                    total_chunks,
                }),
                Err(e) => {
                    tracing::warn!(
                        chunk_index = index,
                        pages = %range,
                        error = %e,
                        "Chunk split failed"
                    );
                    PreparedChunk::Failed(ChunkResult::failed(index, range, e.to_string(), 0))
                }
            })
            .collect();

        if chunks.iter().all(|c| matches!(c, PreparedChunk::Failed(_))) {
            let error = ExtractionError::ChunkingFailed(format!(
                "all {total_chunks} page ranges failed to split"
            ));
            tracing::warn!(error = %error, "Attempting the whole document as one oversized chunk");
            notes.push(ProcessingDetail::failure("chunking", &error));
            return whole_document_plan(buffer, page_count, notes);
        }

        ChunkPlan {
            chunks,
            page_count,
            chunked: true,
            notes,
        }
    }

    #[tracing::instrument(
        skip(self, buffer, ctx),
        fields(
            document_id = %buffer.id.as_uuid(),
            filename = %buffer.filename
        )
    )]
    pub async fn process(
        &self,
        buffer: &DocumentBuffer,
        ctx: &ExtractionContext,
    ) -> Result<ChunkedExtraction, ExtractionError> {
        let plan = self.prepare_chunks(buffer);
        let total_chunks = plan.chunks.len();
        let mut results = Vec::with_capacity(total_chunks);
        let mut last_error = None;
        let mut ocr_page_count = 0;
        let mut calls_made = 0;

        for prepared in plan.chunks {
            ctx.ensure_active("next chunk")?;

            let chunk = match prepared {
                PreparedChunk::Ready(chunk) => chunk,
                PreparedChunk::Failed(result) => {
                    results.push(result);
                    continue;
                }
            };

            if calls_made > 0 {
                self.sleeper.sleep(self.policy.inter_chunk_delay).await;
            }
            calls_made += 1;

            let started = Instant::now();
            let outcome = self
                .ocr
                .extract_text(chunk.buffer.as_bytes(), chunk.buffer.file_type, ctx)
                .await;

            match outcome {
                Ok(output) => {
                    tracing::debug!(
                        chunk_index = chunk.index,
                        pages = %chunk.range,
                        chars = output.text.len(),
                        "Chunk extracted"
                    );
                    ocr_page_count += output.page_count;
                    results.push(ChunkResult::succeeded(
                        chunk.index,
                        chunk.range,
                        output.text,
                        elapsed_ms(started),
                    ));
                }
                Err(e) => {
                    tracing::warn!(
                        chunk_index = chunk.index,
                        pages = %chunk.range,
                        error = %e,
                        "Chunk extraction failed"
                    );
                    results.push(ChunkResult::failed(
                        chunk.index,
                        chunk.range,
                        e.to_string(),
                        elapsed_ms(started),
                    ));
                    last_error = Some(e);
                }
            }
        }

        results.sort_by_key(|r| r.chunk_index);
        let successful = results.iter().filter(|r| r.success).count();
        let success = successful > 0;

        let error = if success {
            None
        } else if results.len() == 1 && last_error.is_some() {
            last_error
        } else {
            Some(ExtractionError::NoTextExtracted(format!(
                "all {} chunks failed OCR",
                results.len()
            )))
        };

        let page_count = if plan.chunked || ocr_page_count == 0 {
            plan.page_count
        } else {
            ocr_page_count
        };

        tracing::info!(
            total_chunks,
            successful_chunks = successful,
            page_count,
            "Chunked OCR finished"
        );

        Ok(ChunkedExtraction {
            success,
            text: Self::combine_results(&results),
            chunk_results: results,
            page_count,
            chunked: plan.chunked,
            error,
            notes: plan.notes,
        })
    }

    /// Joins chunk transcripts in chunk order. Multi-chunk output labels every
    /// section with its page range and keeps an `[Error: ...]` placeholder for
    /// chunks that failed.
    pub fn combine_results(results: &[ChunkResult]) -> String {
        let mut ordered: Vec<&ChunkResult> = results.iter().collect();
        ordered.sort_by_key(|r| r.chunk_index);

        if let [only] = ordered.as_slice() {
            return only.text.clone();
        }

        ordered
            .into_iter()
            .map(|r| {
                let body = if r.success {
                    r.text.trim().to_string()
                } else {
                    format!("[Error: {}]", r.error.as_deref().unwrap_or("unknown error"))
                };
                format!("--- Pages {}-{} ---\n{body}", r.start_page, r.end_page)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn whole_document_plan(
    buffer: &DocumentBuffer,
    page_count: u32,
    notes: Vec<ProcessingDetail>,
) -> ChunkPlan {
    let page_count = page_count.max(1);
    let range = PageRange { start: 1, end: page_count };

    ChunkPlan {
        chunks: vec![PreparedChunk::Ready(Chunk {
            buffer: buffer.clone(),
            index: 0,
            range,
            total_chunks: 1,
        })],
        page_count,
        chunked: false,
        notes,
    }
}
