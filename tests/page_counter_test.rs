mod helpers;

use reportscan::application::services::{PageCountMethod, PageCounter};

use helpers::build_pdf;

#[test]
fn given_page_tree_count_when_counting_then_uses_largest_count() {
    let data = b"%PDF-1.4\n<< /Type /Pages /Count 3 >>\n<< /Type /Pages /Count 45 >>\n%%EOF";

    let counted = PageCounter::new().count_pages(data);

    assert!(counted.success);
    assert_eq!(counted.page_count, 45);
    assert_eq!(counted.method, PageCountMethod::PageTreeCount);
}

#[test]
fn given_no_count_when_counting_then_counts_type_page_markers() {
    let data = b"%PDF-1.4\n1 0 obj << /Type /Pages >>\n2 0 obj << /Type /Page >>\n\
3 0 obj << /Type/Page /Parent 1 0 R >>\n%%EOF";

    let counted = PageCounter::new().count_pages(data);

    assert_eq!(counted.page_count, 2);
    assert_eq!(counted.method, PageCountMethod::TypePageMarkers);
}

#[test]
fn given_only_kids_array_when_counting_then_counts_references() {
    let data = b"%PDF-1.4\n<< /Kids [4 0 R 5 0 R 6 0 R 7 0 R] >>\n%%EOF";

    let counted = PageCounter::new().count_pages(data);

    assert_eq!(counted.page_count, 4);
    assert_eq!(counted.method, PageCountMethod::KidsReferences);
}

#[test]
fn given_no_markers_when_counting_then_estimates_from_size_with_minimum_of_one() {
    let small = vec![b'x'; 1_000];
    let large = vec![b'x'; 50 * 1024 * 3 + 10];

    let small_count = PageCounter::new().count_pages(&small);
    let large_count = PageCounter::new().count_pages(&large);

    assert_eq!(small_count.page_count, 1);
    assert_eq!(small_count.method, PageCountMethod::SizeEstimate);
    assert_eq!(large_count.page_count, 3);
}

#[test]
fn given_empty_buffer_when_counting_then_fails() {
    let counted = PageCounter::new().count_pages(&[]);

    assert!(!counted.success);
    assert_eq!(counted.page_count, 0);
    assert!(counted.error.is_some());
}

#[test]
fn given_binary_noise_around_markers_when_counting_then_still_matches() {
    let mut data = vec![0xFF, 0xFE, 0x00, 0x80];
    data.extend_from_slice(b"<< /Type /Pages /Count 7 >>");
    data.extend_from_slice(&[0xC3, 0x28, 0xA0]);

    let counted = PageCounter::new().count_pages(&data);

    assert_eq!(counted.page_count, 7);
}

#[test]
fn given_generated_pdf_when_counting_then_matches_real_page_count() {
    let data = build_pdf(12);

    let counted = PageCounter::new().count_pages(&data);

    assert_eq!(counted.page_count, 12);
}

#[test]
fn given_single_page_pdf_when_counting_then_returns_one() {
    let data = build_pdf(1);

    let counted = PageCounter::new().count_pages(&data);

    assert!(counted.success);
    assert_eq!(counted.page_count, 1);
}
