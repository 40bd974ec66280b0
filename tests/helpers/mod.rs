#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use reportscan::application::ports::{
    CompressedPayload, CompressionError, OcrClient, OcrResponse, PageSplitter, PayloadCompressor,
    ServiceError, Sleeper, VisionClient, VisionRequest,
};
use reportscan::application::services::{
    ChunkOrchestrator, ChunkingPolicy, ExtractionPipeline, ExtractorConfig, FileTypeDetector,
    HybridOrchestrator, OcrExtractor, VisionExtractor,
};
use reportscan::domain::{ExtractionError, PageRange, SupportedFileType};

pub const OCR_TEXT: &str =
    "Inspection report page text recovered by OCR with enough characters to pass validation.";
pub const VISION_TEXT: &str =
    "Section 1 Roof: shingles intact, minor granule loss near gutters. Section 2 Attic: dry.";

/// Minimal PDF whose page tree declares `pages` pages. Good enough for the
/// byte-level page counter, not for a real PDF parser.
pub fn fake_pdf(pages: u32) -> Vec<u8> {
    let mut data = format!(
        "%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Count {pages} >>\nendobj\n"
    )
    .into_bytes();
    data.resize(data.len().max(256), b' ');
    data.extend_from_slice(b"\n%%EOF\n");
    data
}

pub fn fake_png(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
    data.resize(len, 0);
    data
}

pub fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(len, 0);
    data
}

/// Real multi-page PDF with one line of text per page.
pub fn build_pdf(pages: u32) -> Vec<u8> {
    build_pdf_with_bookmark(pages, None)
}

/// Like [`build_pdf`], optionally with a catalog outline and a named
/// destination both pointing at page `bookmarked`.
pub fn build_pdf_with_bookmark(pages: u32, bookmarked: Option<u32>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    let mut page_ids = Vec::new();
    for number in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Inspection page {number}"))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => i64::from(pages),
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(number) = bookmarked {
        let page_id = page_ids[number as usize - 1];
        let destination: Vec<Object> = vec![page_id.into(), "Fit".into()];
        let outlines_id = doc.new_object_id();
        let item_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(format!("Page {number}")),
            "Parent" => outlines_id,
            "Dest" => destination.clone(),
        });
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => item_id,
                "Last" => item_id,
                "Count" => 1,
            }),
        );
        let dests_id = doc.add_object(dictionary! {
            "Names" => vec![Object::string_literal("bookmark"), destination.into()],
        });
        catalog.set("Outlines", outlines_id);
        catalog.set("Names", dictionary! { "Dests" => dests_id });
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Number of `/Type /Page` objects anywhere in the file, reachable or not.
pub fn page_objects(data: &[u8]) -> usize {
    let doc = Document::load_mem(data).unwrap();
    doc.objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| {
            dict.get(b"Type")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Page")
        })
        .count()
}

pub fn catalog_has(data: &[u8], key: &[u8]) -> bool {
    let doc = Document::load_mem(data).unwrap();
    doc.catalog().unwrap().has(key)
}

type OcrScript = dyn Fn(usize, &[u8]) -> Result<OcrResponse, ServiceError> + Send + Sync;

/// OCR client driven by a closure of (call number starting at 1, input bytes).
pub struct StubOcrClient {
    script: Box<OcrScript>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<Vec<u8>>>,
}

impl StubOcrClient {
    pub fn new(
        script: impl Fn(usize, &[u8]) -> Result<OcrResponse, ServiceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &'static str) -> Self {
        Self::new(move |_, _| {
            Ok(OcrResponse {
                text: text.to_string(),
                page_count: 1,
            })
        })
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(move |_, _| Err(error.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrClient for StubOcrClient {
    async fn analyze(
        &self,
        data: &[u8],
        _mime: &str,
        _model: &str,
    ) -> Result<OcrResponse, ServiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.inputs.lock().unwrap().push(data.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(call, data)
    }
}

type VisionScript = dyn Fn(usize, &VisionRequest) -> Result<String, ServiceError> + Send + Sync;

pub struct StubVisionClient {
    script: Box<VisionScript>,
    calls: AtomicUsize,
    requests: Mutex<Vec<VisionRequest>>,
}

impl StubVisionClient {
    pub fn new(
        script: impl Fn(usize, &VisionRequest) -> Result<String, ServiceError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &'static str) -> Self {
        Self::new(move |_, _| Ok(text.to_string()))
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(move |_, _| Err(error.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionClient for StubVisionClient {
    async fn complete(&self, request: &VisionRequest) -> Result<String, ServiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        (self.script)(call, request)
    }
}

/// Records requested delays without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Produces a tiny fake PDF per range whose body names the range, e.g.
/// `%PDF-1.4 pages 16-30`, and fails for ranges starting at a listed page.
#[derive(Default)]
pub struct RecordingSplitter {
    failing_starts: HashSet<u32>,
    ranges: Mutex<Vec<PageRange>>,
}

impl RecordingSplitter {
    pub fn failing_at(starts: &[u32]) -> Self {
        Self {
            failing_starts: starts.iter().copied().collect(),
            ranges: Mutex::new(Vec::new()),
        }
    }

    pub fn ranges(&self) -> Vec<PageRange> {
        self.ranges.lock().unwrap().clone()
    }
}

impl PageSplitter for RecordingSplitter {
    fn split(&self, _data: &[u8], range: PageRange) -> Result<Vec<u8>, ExtractionError> {
        self.ranges.lock().unwrap().push(range);
        if self.failing_starts.contains(&range.start) {
            return Err(ExtractionError::PageExtractionFailed(format!(
                "cannot extract pages {range}"
            )));
        }
        Ok(chunk_marker(range).into_bytes())
    }
}

pub fn chunk_marker(range: PageRange) -> String {
    format!("%PDF-1.4 pages {}-{}", range.start, range.end)
}

/// Range named by a [`RecordingSplitter`] chunk, if the bytes are one.
pub fn parse_chunk_marker(data: &[u8]) -> Option<(u32, u32)> {
    let text = std::str::from_utf8(data).ok()?;
    let (start, end) = text.strip_prefix("%PDF-1.4 pages ")?.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

pub struct PassthroughCompressor;

impl PayloadCompressor for PassthroughCompressor {
    fn compress(
        &self,
        data: &[u8],
        file_type: SupportedFileType,
        _limit: usize,
    ) -> Result<CompressedPayload, CompressionError> {
        Ok(CompressedPayload {
            data: data.to_vec(),
            mime: file_type.as_mime().to_string(),
        })
    }
}

/// Fully wired services around stub clients. Retries default to zero so each
/// failure costs exactly one call.
pub struct Harness {
    pub ocr_client: Arc<StubOcrClient>,
    pub vision_client: Arc<StubVisionClient>,
    pub splitter: Arc<RecordingSplitter>,
    pub sleeper: Arc<RecordingSleeper>,
    pub ocr: Arc<OcrExtractor>,
    pub chunker: Arc<ChunkOrchestrator>,
    pub vision: Arc<VisionExtractor>,
}

impl Harness {
    pub fn new(ocr_client: StubOcrClient, vision_client: StubVisionClient) -> Self {
        Self::with_splitter(ocr_client, vision_client, RecordingSplitter::default(), 0)
    }

    pub fn with_splitter(
        ocr_client: StubOcrClient,
        vision_client: StubVisionClient,
        splitter: RecordingSplitter,
        retries: u32,
    ) -> Self {
        let ocr_client = Arc::new(ocr_client);
        let vision_client = Arc::new(vision_client);
        let splitter = Arc::new(splitter);
        let sleeper = Arc::new(RecordingSleeper::default());

        let ocr = Arc::new(OcrExtractor::new(
            ocr_client.clone(),
            sleeper.clone(),
            ExtractorConfig::new(retries, "prebuilt-layout", 0),
        ));
        let chunker = Arc::new(ChunkOrchestrator::new(
            ocr.clone(),
            splitter.clone(),
            sleeper.clone(),
            ChunkingPolicy::default(),
        ));
        let vision = Arc::new(VisionExtractor::new(
            vision_client.clone(),
            Arc::new(PassthroughCompressor),
            sleeper.clone(),
            ExtractorConfig::new(retries, "gpt-4o", 4096),
        ));

        Self {
            ocr_client,
            vision_client,
            splitter,
            sleeper,
            ocr,
            chunker,
            vision,
        }
    }

    pub fn hybrid(&self) -> HybridOrchestrator {
        HybridOrchestrator::new(self.chunker.clone(), self.vision.clone())
    }

    pub fn pipeline(&self) -> ExtractionPipeline {
        ExtractionPipeline::new(
            FileTypeDetector::default(),
            self.chunker.clone(),
            self.vision.clone(),
        )
    }
}
