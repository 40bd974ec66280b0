use std::sync::LazyLock;

use regex::bytes::Regex;

const BYTES_PER_PAGE_ESTIMATE: usize = 50 * 1024;

static COUNT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Count\s+(\d+)").expect("valid /Count regex"));
static TYPE_PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page(?-u:\b)").expect("valid /Type /Page regex"));
static PAGE_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s+0\s+obj\s*<<(?-u:[^>])*?/Page(?-u:\b)").expect("valid page object regex")
});
static KIDS_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Kids\s*\[((?-u:[^\]])*)\]").expect("valid /Kids regex"));
static INDIRECT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s+\d+\s+R").expect("valid reference regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCountMethod {
    PageTreeCount,
    TypePageMarkers,
    PageObjects,
    KidsReferences,
    SizeEstimate,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageCount {
    pub page_count: u32,
    pub success: bool,
    pub error: Option<String>,
    pub method: PageCountMethod,
}

/// Estimates a PDF's page count from its raw bytes without rendering it.
///
/// The heuristics run in order and the first one that finds anything wins.
/// Compressed object streams hide most markers, so the byte-size estimate is
/// the expected answer for many real scans.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageCounter;

impl PageCounter {
    pub fn new() -> Self {
        Self
    }

    pub fn count_pages(&self, data: &[u8]) -> PageCount {
        if data.is_empty() {
            return PageCount {
                page_count: 0,
                success: false,
                error: Some("cannot count pages of an empty buffer".to_string()),
                method: PageCountMethod::None,
            };
        }

        let (page_count, method) = if let Some(n) = max_count_token(data) {
            (n, PageCountMethod::PageTreeCount)
        } else if let Some(n) = nonzero(TYPE_PAGE_MARKER.find_iter(data).count()) {
            (n, PageCountMethod::TypePageMarkers)
        } else if let Some(n) = nonzero(PAGE_OBJECT.find_iter(data).count()) {
            (n, PageCountMethod::PageObjects)
        } else if let Some(n) = largest_kids_array(data) {
            (n, PageCountMethod::KidsReferences)
        } else {
            (size_estimate(data.len()), PageCountMethod::SizeEstimate)
        };

        tracing::debug!(page_count, ?method, bytes = data.len(), "Counted PDF pages");

        PageCount {
            page_count,
            success: true,
            error: None,
            method,
        }
    }
}

fn nonzero(count: usize) -> Option<u32> {
    u32::try_from(count).ok().filter(|n| *n > 0)
}

fn max_count_token(data: &[u8]) -> Option<u32> {
    COUNT_TOKEN
        .captures_iter(data)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| std::str::from_utf8(m.as_bytes()).ok()?.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .max()
}

fn largest_kids_array(data: &[u8]) -> Option<u32> {
    KIDS_ARRAY
        .captures_iter(data)
        .filter_map(|caps| caps.get(1))
        .map(|kids| INDIRECT_REF.find_iter(kids.as_bytes()).count())
        .max()
        .and_then(nonzero)
}

fn size_estimate(len: usize) -> u32 {
    u32::try_from(len / BYTES_PER_PAGE_ESTIMATE)
        .unwrap_or(u32::MAX)
        .max(1)
}
